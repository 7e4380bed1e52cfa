// Tue Jan 20 2026 - Alex

use cpp_demangle::{BorrowedSymbol, DemangleOptions};

/// Demangle an Itanium-ABI symbol for display. The mangled input is
/// returned unchanged when it does not demangle.
pub fn demangle(mangled: &str) -> String {
    let bytes = mangled.as_bytes();
    if let Ok(symbol) = BorrowedSymbol::new(bytes) {
        if let Ok(demangled) = symbol.demangle(&DemangleOptions::default()) {
            return demangled;
        }
    }
    mangled.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demangle_passthrough() {
        assert_eq!(demangle("main"), "main");
        assert_eq!(demangle("Namespace::Type::member"), "Namespace::Type::member");
    }

    #[test]
    fn test_demangle_itanium() {
        assert_eq!(demangle("_Z3fooi"), "foo(int)");
    }
}

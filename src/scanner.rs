// Fri Jan 23 2026 - Alex

use crate::analyze::{enforce_odrv_for_die_list, filter_report, OdrvReport};
use crate::config::Config;
use crate::dwarf::{AttributeSequence, Die, ObjectAncestry};
use crate::engine::TaskPool;
use crate::formats::{dwarf_from_object_file, parse_file, Callbacks, FormatError, ParseContext};
use crate::memory::Reader;
use crate::output::{progress_line, PrintQueue};
use crate::registry::{CounterSnapshot, DieRegistry};
use crate::strings::StringPool;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The ODRV engine: parses every input on the worker pool, registers DIEs
/// by identity, then enforces the one-definition rule over every chain.
///
/// All run state lives here; dropping the scanner (or calling `reset`)
/// releases everything except the string-pool arenas, which are immortal by
/// design.
pub struct Scanner {
    config: Config,
    pool: Arc<StringPool>,
    registry: Arc<DieRegistry>,
    tasks: Arc<TaskPool>,
    print: Arc<PrintQueue>,
}

impl Scanner {
    pub fn new(mut config: Config) -> Self {
        config.normalize();
        let tasks = Arc::new(TaskPool::new(config.threads, config.parallel_processing));
        Self {
            config,
            pool: Arc::new(StringPool::new()),
            registry: Arc::new(DieRegistry::new()),
            tasks,
            print: Arc::new(PrintQueue::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn counters(&self) -> CounterSnapshot {
        self.registry.counters.snapshot()
    }

    pub fn unique_symbol_count(&self) -> usize {
        self.registry.unique_symbol_count()
    }

    /// Equivalent to constructing a fresh scanner: registry, batches, and
    /// counters are dropped. Interned strings stay valid.
    pub fn reset(&self) {
        self.registry.reset();
    }

    /// Process every input path and return the surviving ODRV reports,
    /// sorted by symbol.
    pub fn process(&self, file_list: &[PathBuf]) -> Vec<OdrvReport> {
        // First stage: parse and register all the DIEs.
        for input_path in file_list {
            let context = self.parse_context(input_path);
            let path = input_path.clone();
            let prefix = self.config.problem_prefix();
            let print = self.print.clone();

            self.tasks.submit(move || {
                if !path.exists() {
                    print.err_line(&format!(
                        "{}: file {} does not exist",
                        prefix,
                        path.display()
                    ));
                    return;
                }

                let reader = match Reader::open(&path) {
                    Ok(reader) => reader,
                    Err(error) => {
                        print.err_line(&format!("{}: {}: {}", prefix, path.display(), error));
                        return;
                    }
                };

                let size = reader.size();
                let name = path.to_string_lossy().to_string();
                if let Err(error) =
                    parse_file(&name, &ObjectAncestry::new(), reader, size, context)
                {
                    print.err_line(&format!("{}: {}: {}", prefix, name, error));
                }
            });
        }

        self.tasks.wait();

        // Second stage: review every chain for ODRVs.
        let results: Arc<Mutex<Vec<OdrvReport>>> = Arc::new(Mutex::new(Vec::new()));

        for (hash, head) in self.registry.entries() {
            let pool = self.pool.clone();
            let registry = self.registry.clone();
            let results = results.clone();
            let print = self.print.clone();
            let show_progress = self.config.show_progress;

            self.tasks.submit(move || {
                let fetch_pool = pool.clone();
                let fetch_registry = registry.clone();
                let fetch = move |die: &Die| -> Result<AttributeSequence, FormatError> {
                    let mut parser =
                        dwarf_from_object_file(&fetch_pool, &fetch_registry, die.ofd_index)?;
                    let (fetched, attributes) = parser.fetch_one_die(die.debug_info_offset)?;
                    debug_assert_eq!(fetched.tag, die.tag);
                    debug_assert_eq!(fetched.arch, die.arch);
                    debug_assert_eq!(fetched.has_children, die.has_children);
                    Ok(attributes)
                };

                let new_head = enforce_odrv_for_die_list(&registry, head, &fetch, &results);
                registry.update_head(hash, new_head);

                if show_progress {
                    print.out(&progress_line(registry.counters.snapshot()));
                }
            });
        }

        self.tasks.wait();

        let mut reports = std::mem::take(&mut *results.lock());
        reports.retain(|report| {
            filter_report(
                report,
                &self.config.violation_ignore,
                &self.config.violation_report,
            )
        });
        reports.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        if self.config.show_progress {
            self.print
                .out(&progress_line(self.registry.counters.snapshot()));
            self.print.out("\n");
        }

        reports
    }

    fn parse_context(&self, root: &Path) -> ParseContext {
        let registry = self.registry.clone();
        let print = self.print.clone();
        let show_progress = self.config.show_progress;
        let trace_paths = self.config.print_symbol_paths;

        let register_dies = Arc::new(move |dies: Vec<Die>| {
            if trace_paths {
                for die in &dies {
                    print.out_line(&format!(
                        "{} - 0x{:08x} {}",
                        if die.skippable { 'S' } else { 'R' },
                        die.debug_info_offset,
                        die.path
                    ));
                }
            }

            registry.register_batch(dies);

            if show_progress {
                print.out(&progress_line(registry.counters.snapshot()));
            }
        });

        let tasks = self.tasks.clone();
        let do_work = Arc::new(move |job: Box<dyn FnOnce() + Send + 'static>| {
            tasks.submit(job);
        });

        ParseContext {
            pool: self.pool.clone(),
            registry: self.registry.clone(),
            root_path: root.to_path_buf(),
            callbacks: Callbacks {
                register_dies,
                do_work,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{
        archive, fat_bundle, fixture_object, write_temp_file, CPU_TYPE_ARM64, CPU_TYPE_X86_64,
    };

    fn scanner(config: Config) -> Scanner {
        Scanner::new(config)
    }

    fn serial_config() -> Config {
        Config {
            parallel_processing: false,
            ..Config::default()
        }
    }

    #[test]
    fn test_empty_input_list() {
        let scanner = scanner(serial_config());
        let reports = scanner.process(&[]);
        assert!(reports.is_empty());
        assert_eq!(scanner.counters(), CounterSnapshot::default());
    }

    #[test]
    fn test_identical_compilations_no_reports() {
        let bytes = fixture_object(CPU_TYPE_ARM64, "int", 4, 7);
        let a = write_temp_file("identical", "a.o", &bytes);
        let b = write_temp_file("identical", "b.o", &bytes);

        let scanner = scanner(serial_config());
        let reports = scanner.process(&[a, b]);

        assert!(reports.is_empty());
        // namespace N, N::foo, and the base type are the unique symbols
        assert_eq!(scanner.unique_symbol_count(), 3);
        let counters = scanner.counters();
        assert_eq!(counters.processed, 8);
        assert_eq!(counters.analyzed, 8);
        assert_eq!(counters.violations, 0);
    }

    #[test]
    fn test_signature_drift_reports_type_conflict() {
        let a = write_temp_file("drift", "a.o", &fixture_object(CPU_TYPE_ARM64, "int", 4, 7));
        let b = write_temp_file("drift", "b.o", &fixture_object(CPU_TYPE_ARM64, "long", 8, 7));

        let scanner = scanner(serial_config());
        let reports = scanner.process(&[a, b]);

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.symbol, "N::foo");
        assert_eq!(report.category(), "subprogram:type");
        assert_eq!(report.conflict_map.len(), 2);
        assert_eq!(scanner.counters().violations, 1);
    }

    #[test]
    fn test_decl_line_only_difference_no_reports() {
        let a = write_temp_file("lineonly", "a.o", &fixture_object(CPU_TYPE_ARM64, "int", 4, 7));
        let b = write_temp_file("lineonly", "b.o", &fixture_object(CPU_TYPE_ARM64, "int", 4, 99));

        let scanner = scanner(serial_config());
        let reports = scanner.process(&[a, b]);
        assert!(reports.is_empty());
        assert_eq!(scanner.counters().violations, 0);
    }

    #[test]
    fn test_ignore_list_filters_reports() {
        let a = write_temp_file("ignored", "a.o", &fixture_object(CPU_TYPE_ARM64, "int", 4, 7));
        let b = write_temp_file("ignored", "b.o", &fixture_object(CPU_TYPE_ARM64, "long", 8, 7));

        let config = Config {
            parallel_processing: false,
            violation_ignore: vec!["subprogram:type".to_string()],
            ..Config::default()
        };
        let scanner = scanner(config);
        let reports = scanner.process(&[a, b]);
        assert!(reports.is_empty());
        // the violation was still found, just not reported
        assert_eq!(scanner.counters().violations, 1);
    }

    #[test]
    fn test_report_only_list() {
        let a = write_temp_file("onlylist", "a.o", &fixture_object(CPU_TYPE_ARM64, "int", 4, 7));
        let b = write_temp_file("onlylist", "b.o", &fixture_object(CPU_TYPE_ARM64, "long", 8, 7));

        let config = Config {
            parallel_processing: false,
            violation_report: vec!["structure_type:byte_size".to_string()],
            ..Config::default()
        };
        let reports = scanner(config).process(&[a, b]);
        assert!(reports.is_empty());
    }

    #[test]
    fn test_struct_member_count_drift() {
        use crate::utils::testing::struct_object;

        let a = write_temp_file("members", "a.o", &struct_object(CPU_TYPE_ARM64, &["x"]));
        let b = write_temp_file("members", "b.o", &struct_object(CPU_TYPE_ARM64, &["x", "y"]));

        let scanner = scanner(serial_config());
        let reports = scanner.process(&[a, b]);

        // S itself diverges (byte_size 4 vs 8); S::y exists on one side only
        // and chains alone, so exactly one report surfaces
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.symbol, "S");
        assert_eq!(report.category(), "structure_type:byte_size");
        assert_eq!(report.conflict_map.len(), 2);
    }

    #[test]
    fn test_fat_bundle_registers_per_arch() {
        let arm = fixture_object(CPU_TYPE_ARM64, "int", 4, 7);
        let x86 = fixture_object(CPU_TYPE_X86_64, "int", 4, 7);
        let fat = fat_bundle(&[(CPU_TYPE_ARM64, arm), (CPU_TYPE_X86_64, x86)]);
        let path = write_temp_file("fat", "universal.o", &fat);

        let scanner = scanner(serial_config());
        let reports = scanner.process(&[path]);

        assert!(reports.is_empty());
        // each slice contributes its own arch-scoped identities
        assert_eq!(scanner.unique_symbol_count(), 6);
        assert_eq!(scanner.counters().processed, 8);
    }

    #[test]
    fn test_archive_members_conflict() {
        let a = fixture_object(CPU_TYPE_ARM64, "int", 4, 7);
        let b = fixture_object(CPU_TYPE_ARM64, "long", 8, 7);
        let bytes = archive(&[("a.o", a), ("b.o", b)]);
        let path = write_temp_file("archive", "libfoo.a", &bytes);

        let scanner = scanner(serial_config());
        let reports = scanner.process(&[path]);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].category(), "subprogram:type");
        // both definitions name the archive in their ancestry
        for entry in reports[0].conflict_map.values() {
            assert_eq!(entry.ancestry.len(), 2);
        }
    }

    #[test]
    fn test_missing_input_is_reported_not_fatal() {
        let scanner = scanner(serial_config());
        let reports = scanner.process(&[PathBuf::from("/nonexistent/missing.o")]);
        assert!(reports.is_empty());
        assert_eq!(scanner.counters(), CounterSnapshot::default());
    }

    #[test]
    fn test_parallel_processing_matches_serial() {
        let a = write_temp_file("parallel", "a.o", &fixture_object(CPU_TYPE_ARM64, "int", 4, 7));
        let b = write_temp_file("parallel", "b.o", &fixture_object(CPU_TYPE_ARM64, "long", 8, 7));
        let files = vec![a, b];

        let serial_reports = scanner(serial_config()).process(&files);

        let config = Config {
            parallel_processing: true,
            threads: 4,
            ..Config::default()
        };
        let parallel_scanner = scanner(config);
        let parallel_reports = parallel_scanner.process(&files);

        assert_eq!(serial_reports.len(), parallel_reports.len());
        assert_eq!(serial_reports[0].symbol, parallel_reports[0].symbol);
        assert_eq!(serial_reports[0].category(), parallel_reports[0].category());
    }

    #[test]
    fn test_reports_sorted_by_symbol() {
        // two conflicting symbols in one pair of objects would need a richer
        // fixture; instead check the sort holds over repeated runs of the
        // single-conflict fixture
        let a = write_temp_file("sorted", "a.o", &fixture_object(CPU_TYPE_ARM64, "int", 4, 7));
        let b = write_temp_file("sorted", "b.o", &fixture_object(CPU_TYPE_ARM64, "long", 8, 7));
        let files = vec![a, b];

        let first = scanner(serial_config()).process(&files);
        let second = scanner(serial_config()).process(&files);
        let firsts: Vec<String> = first.iter().map(|r| r.symbol.clone()).collect();
        let seconds: Vec<String> = second.iter().map(|r| r.symbol.clone()).collect();
        assert_eq!(firsts, seconds);
    }

    #[test]
    fn test_reset_clears_run_state() {
        let a = write_temp_file("reset", "a.o", &fixture_object(CPU_TYPE_ARM64, "int", 4, 7));

        let scanner = scanner(serial_config());
        scanner.process(&[a.clone()]);
        assert!(scanner.unique_symbol_count() > 0);

        scanner.reset();
        assert_eq!(scanner.unique_symbol_count(), 0);
        assert_eq!(scanner.counters(), CounterSnapshot::default());

        // a fresh run over the same input behaves identically
        let reports = scanner.process(&[a]);
        assert!(reports.is_empty());
        assert_eq!(scanner.unique_symbol_count(), 3);
    }
}

// Tue Jan 20 2026 - Alex

use std::fmt;

/// DWARF tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    None,
    ArrayType,
    ClassType,
    EntryPoint,
    EnumerationType,
    FormalParameter,
    ImportedDeclaration,
    Label,
    LexicalBlock,
    Member,
    PointerType,
    ReferenceType,
    CompileUnit,
    StringType,
    StructureType,
    SubroutineType,
    Typedef,
    UnionType,
    UnspecifiedParameters,
    Variant,
    CommonBlock,
    CommonInclusion,
    Inheritance,
    InlinedSubroutine,
    Module,
    PtrToMemberType,
    SetType,
    SubrangeType,
    WithStmt,
    AccessDeclaration,
    BaseType,
    CatchBlock,
    ConstType,
    Constant,
    Enumerator,
    FileType,
    Friend,
    Namelist,
    NamelistItem,
    PackedType,
    Subprogram,
    TemplateTypeParameter,
    TemplateValueParameter,
    ThrownType,
    TryBlock,
    VariantPart,
    Variable,
    VolatileType,
    DwarfProcedure,
    RestrictType,
    InterfaceType,
    Namespace,
    ImportedModule,
    UnspecifiedType,
    PartialUnit,
    ImportedUnit,
    Condition,
    SharedType,
    TypeUnit,
    RvalueReferenceType,
    TemplateAlias,
    CoarrayType,
    GenericSubrange,
    DynamicType,
    AtomicType,
    CallSite,
    CallSiteParameter,
    SkeletonUnit,
    ImmutableType,
    GnuCallSite,
    GnuCallSiteParameter,
    AppleProperty,
    Unknown(u16),
}

impl Tag {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0x00 => Tag::None,
            0x01 => Tag::ArrayType,
            0x02 => Tag::ClassType,
            0x03 => Tag::EntryPoint,
            0x04 => Tag::EnumerationType,
            0x05 => Tag::FormalParameter,
            0x08 => Tag::ImportedDeclaration,
            0x0a => Tag::Label,
            0x0b => Tag::LexicalBlock,
            0x0d => Tag::Member,
            0x0f => Tag::PointerType,
            0x10 => Tag::ReferenceType,
            0x11 => Tag::CompileUnit,
            0x12 => Tag::StringType,
            0x13 => Tag::StructureType,
            0x15 => Tag::SubroutineType,
            0x16 => Tag::Typedef,
            0x17 => Tag::UnionType,
            0x18 => Tag::UnspecifiedParameters,
            0x19 => Tag::Variant,
            0x1a => Tag::CommonBlock,
            0x1b => Tag::CommonInclusion,
            0x1c => Tag::Inheritance,
            0x1d => Tag::InlinedSubroutine,
            0x1e => Tag::Module,
            0x1f => Tag::PtrToMemberType,
            0x20 => Tag::SetType,
            0x21 => Tag::SubrangeType,
            0x22 => Tag::WithStmt,
            0x23 => Tag::AccessDeclaration,
            0x24 => Tag::BaseType,
            0x25 => Tag::CatchBlock,
            0x26 => Tag::ConstType,
            0x27 => Tag::Constant,
            0x28 => Tag::Enumerator,
            0x29 => Tag::FileType,
            0x2a => Tag::Friend,
            0x2b => Tag::Namelist,
            0x2c => Tag::NamelistItem,
            0x2d => Tag::PackedType,
            0x2e => Tag::Subprogram,
            0x2f => Tag::TemplateTypeParameter,
            0x30 => Tag::TemplateValueParameter,
            0x31 => Tag::ThrownType,
            0x32 => Tag::TryBlock,
            0x33 => Tag::VariantPart,
            0x34 => Tag::Variable,
            0x35 => Tag::VolatileType,
            0x36 => Tag::DwarfProcedure,
            0x37 => Tag::RestrictType,
            0x38 => Tag::InterfaceType,
            0x39 => Tag::Namespace,
            0x3a => Tag::ImportedModule,
            0x3b => Tag::UnspecifiedType,
            0x3c => Tag::PartialUnit,
            0x3d => Tag::ImportedUnit,
            0x3f => Tag::Condition,
            0x40 => Tag::SharedType,
            0x41 => Tag::TypeUnit,
            0x42 => Tag::RvalueReferenceType,
            0x43 => Tag::TemplateAlias,
            0x44 => Tag::CoarrayType,
            0x45 => Tag::GenericSubrange,
            0x46 => Tag::DynamicType,
            0x47 => Tag::AtomicType,
            0x48 => Tag::CallSite,
            0x49 => Tag::CallSiteParameter,
            0x4a => Tag::SkeletonUnit,
            0x4b => Tag::ImmutableType,
            0x4109 => Tag::GnuCallSite,
            0x410a => Tag::GnuCallSiteParameter,
            0x4200 => Tag::AppleProperty,
            other => Tag::Unknown(other as u16),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Tag::None => 0x00,
            Tag::ArrayType => 0x01,
            Tag::ClassType => 0x02,
            Tag::EntryPoint => 0x03,
            Tag::EnumerationType => 0x04,
            Tag::FormalParameter => 0x05,
            Tag::ImportedDeclaration => 0x08,
            Tag::Label => 0x0a,
            Tag::LexicalBlock => 0x0b,
            Tag::Member => 0x0d,
            Tag::PointerType => 0x0f,
            Tag::ReferenceType => 0x10,
            Tag::CompileUnit => 0x11,
            Tag::StringType => 0x12,
            Tag::StructureType => 0x13,
            Tag::SubroutineType => 0x15,
            Tag::Typedef => 0x16,
            Tag::UnionType => 0x17,
            Tag::UnspecifiedParameters => 0x18,
            Tag::Variant => 0x19,
            Tag::CommonBlock => 0x1a,
            Tag::CommonInclusion => 0x1b,
            Tag::Inheritance => 0x1c,
            Tag::InlinedSubroutine => 0x1d,
            Tag::Module => 0x1e,
            Tag::PtrToMemberType => 0x1f,
            Tag::SetType => 0x20,
            Tag::SubrangeType => 0x21,
            Tag::WithStmt => 0x22,
            Tag::AccessDeclaration => 0x23,
            Tag::BaseType => 0x24,
            Tag::CatchBlock => 0x25,
            Tag::ConstType => 0x26,
            Tag::Constant => 0x27,
            Tag::Enumerator => 0x28,
            Tag::FileType => 0x29,
            Tag::Friend => 0x2a,
            Tag::Namelist => 0x2b,
            Tag::NamelistItem => 0x2c,
            Tag::PackedType => 0x2d,
            Tag::Subprogram => 0x2e,
            Tag::TemplateTypeParameter => 0x2f,
            Tag::TemplateValueParameter => 0x30,
            Tag::ThrownType => 0x31,
            Tag::TryBlock => 0x32,
            Tag::VariantPart => 0x33,
            Tag::Variable => 0x34,
            Tag::VolatileType => 0x35,
            Tag::DwarfProcedure => 0x36,
            Tag::RestrictType => 0x37,
            Tag::InterfaceType => 0x38,
            Tag::Namespace => 0x39,
            Tag::ImportedModule => 0x3a,
            Tag::UnspecifiedType => 0x3b,
            Tag::PartialUnit => 0x3c,
            Tag::ImportedUnit => 0x3d,
            Tag::Condition => 0x3f,
            Tag::SharedType => 0x40,
            Tag::TypeUnit => 0x41,
            Tag::RvalueReferenceType => 0x42,
            Tag::TemplateAlias => 0x43,
            Tag::CoarrayType => 0x44,
            Tag::GenericSubrange => 0x45,
            Tag::DynamicType => 0x46,
            Tag::AtomicType => 0x47,
            Tag::CallSite => 0x48,
            Tag::CallSiteParameter => 0x49,
            Tag::SkeletonUnit => 0x4a,
            Tag::ImmutableType => 0x4b,
            Tag::GnuCallSite => 0x4109,
            Tag::GnuCallSiteParameter => 0x410a,
            Tag::AppleProperty => 0x4200,
            Tag::Unknown(v) => *v as u32,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::None => "none",
            Tag::ArrayType => "array_type",
            Tag::ClassType => "class_type",
            Tag::EntryPoint => "entry_point",
            Tag::EnumerationType => "enumeration_type",
            Tag::FormalParameter => "formal_parameter",
            Tag::ImportedDeclaration => "imported_declaration",
            Tag::Label => "label",
            Tag::LexicalBlock => "lexical_block",
            Tag::Member => "member",
            Tag::PointerType => "pointer_type",
            Tag::ReferenceType => "reference_type",
            Tag::CompileUnit => "compile_unit",
            Tag::StringType => "string_type",
            Tag::StructureType => "structure_type",
            Tag::SubroutineType => "subroutine_type",
            Tag::Typedef => "typedef",
            Tag::UnionType => "union_type",
            Tag::UnspecifiedParameters => "unspecified_parameters",
            Tag::Variant => "variant",
            Tag::CommonBlock => "common_block",
            Tag::CommonInclusion => "common_inclusion",
            Tag::Inheritance => "inheritance",
            Tag::InlinedSubroutine => "inlined_subroutine",
            Tag::Module => "module",
            Tag::PtrToMemberType => "ptr_to_member_type",
            Tag::SetType => "set_type",
            Tag::SubrangeType => "subrange_type",
            Tag::WithStmt => "with_stmt",
            Tag::AccessDeclaration => "access_declaration",
            Tag::BaseType => "base_type",
            Tag::CatchBlock => "catch_block",
            Tag::ConstType => "const_type",
            Tag::Constant => "constant",
            Tag::Enumerator => "enumerator",
            Tag::FileType => "file_type",
            Tag::Friend => "friend",
            Tag::Namelist => "namelist",
            Tag::NamelistItem => "namelist_item",
            Tag::PackedType => "packed_type",
            Tag::Subprogram => "subprogram",
            Tag::TemplateTypeParameter => "template_type_parameter",
            Tag::TemplateValueParameter => "template_value_parameter",
            Tag::ThrownType => "thrown_type",
            Tag::TryBlock => "try_block",
            Tag::VariantPart => "variant_part",
            Tag::Variable => "variable",
            Tag::VolatileType => "volatile_type",
            Tag::DwarfProcedure => "dwarf_procedure",
            Tag::RestrictType => "restrict_type",
            Tag::InterfaceType => "interface_type",
            Tag::Namespace => "namespace",
            Tag::ImportedModule => "imported_module",
            Tag::UnspecifiedType => "unspecified_type",
            Tag::PartialUnit => "partial_unit",
            Tag::ImportedUnit => "imported_unit",
            Tag::Condition => "condition",
            Tag::SharedType => "shared_type",
            Tag::TypeUnit => "type_unit",
            Tag::RvalueReferenceType => "rvalue_reference_type",
            Tag::TemplateAlias => "template_alias",
            Tag::CoarrayType => "coarray_type",
            Tag::GenericSubrange => "generic_subrange",
            Tag::DynamicType => "dynamic_type",
            Tag::AtomicType => "atomic_type",
            Tag::CallSite => "call_site",
            Tag::CallSiteParameter => "call_site_parameter",
            Tag::SkeletonUnit => "skeleton_unit",
            Tag::ImmutableType => "immutable_type",
            Tag::GnuCallSite => "gnu_call_site",
            Tag::GnuCallSiteParameter => "gnu_call_site_parameter",
            Tag::AppleProperty => "apple_property",
            Tag::Unknown(v) => return write!(f, "tag_{:#06x}", v),
        };
        f.write_str(name)
    }
}

/// DWARF attribute names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum At {
    None,
    Sibling,
    Location,
    Name,
    Ordering,
    ByteSize,
    BitOffset,
    BitSize,
    StmtList,
    LowPc,
    HighPc,
    Language,
    Visibility,
    Import,
    StringLength,
    CommonReference,
    CompDir,
    ConstValue,
    ContainingType,
    DefaultValue,
    Inline,
    IsOptional,
    LowerBound,
    Producer,
    Prototyped,
    ReturnAddr,
    StartScope,
    BitStride,
    UpperBound,
    AbstractOrigin,
    Accessibility,
    AddressClass,
    Artificial,
    BaseTypes,
    CallingConvention,
    Count,
    DataMemberLocation,
    DeclColumn,
    DeclFile,
    DeclLine,
    Declaration,
    DiscrList,
    Encoding,
    External,
    FrameBase,
    Friend,
    IdentifierCase,
    MacroInfo,
    NamelistItem,
    Priority,
    Segment,
    Specification,
    StaticLink,
    Type,
    UseLocation,
    VariableParameter,
    Virtuality,
    VtableElemLocation,
    Allocated,
    Associated,
    DataLocation,
    ByteStride,
    EntryPc,
    UseUtf8,
    Extension,
    Ranges,
    Trampoline,
    CallColumn,
    CallFile,
    CallLine,
    Description,
    Mutable,
    ThreadsScaled,
    Explicit,
    ObjectPointer,
    Endianity,
    Elemental,
    Pure,
    Recursive,
    Signature,
    MainSubprogram,
    DataBitOffset,
    ConstExpr,
    EnumClass,
    LinkageName,
    StrOffsetsBase,
    AddrBase,
    RnglistsBase,
    DwoName,
    Reference,
    RvalueReference,
    Macros,
    CallAllCalls,
    CallAllSourceCalls,
    CallAllTailCalls,
    CallReturnPc,
    CallValue,
    CallOrigin,
    CallParameter,
    CallPc,
    CallTailCall,
    CallTarget,
    CallTargetClobbered,
    CallDataLocation,
    CallDataValue,
    Noreturn,
    Alignment,
    ExportSymbols,
    Deleted,
    Defaulted,
    LoclistsBase,
    MipsLinkageName,
    AppleOptimized,
    AppleFlags,
    AppleIsa,
    AppleBlock,
    AppleMajorRuntimeVers,
    AppleRuntimeClass,
    AppleOmitFramePtr,
    ApplePropertyName,
    ApplePropertyGetter,
    ApplePropertySetter,
    ApplePropertyAttribute,
    AppleObjcCompleteType,
    AppleProperty,
    AppleObjcDirect,
    AppleSdk,
    Unknown(u16),
}

impl At {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0x00 => At::None,
            0x01 => At::Sibling,
            0x02 => At::Location,
            0x03 => At::Name,
            0x09 => At::Ordering,
            0x0b => At::ByteSize,
            0x0c => At::BitOffset,
            0x0d => At::BitSize,
            0x10 => At::StmtList,
            0x11 => At::LowPc,
            0x12 => At::HighPc,
            0x13 => At::Language,
            0x17 => At::Visibility,
            0x18 => At::Import,
            0x19 => At::StringLength,
            0x1a => At::CommonReference,
            0x1b => At::CompDir,
            0x1c => At::ConstValue,
            0x1d => At::ContainingType,
            0x1e => At::DefaultValue,
            0x20 => At::Inline,
            0x21 => At::IsOptional,
            0x22 => At::LowerBound,
            0x25 => At::Producer,
            0x27 => At::Prototyped,
            0x2a => At::ReturnAddr,
            0x2c => At::StartScope,
            0x2e => At::BitStride,
            0x2f => At::UpperBound,
            0x31 => At::AbstractOrigin,
            0x32 => At::Accessibility,
            0x33 => At::AddressClass,
            0x34 => At::Artificial,
            0x35 => At::BaseTypes,
            0x36 => At::CallingConvention,
            0x37 => At::Count,
            0x38 => At::DataMemberLocation,
            0x39 => At::DeclColumn,
            0x3a => At::DeclFile,
            0x3b => At::DeclLine,
            0x3c => At::Declaration,
            0x3d => At::DiscrList,
            0x3e => At::Encoding,
            0x3f => At::External,
            0x40 => At::FrameBase,
            0x41 => At::Friend,
            0x42 => At::IdentifierCase,
            0x43 => At::MacroInfo,
            0x44 => At::NamelistItem,
            0x45 => At::Priority,
            0x46 => At::Segment,
            0x47 => At::Specification,
            0x48 => At::StaticLink,
            0x49 => At::Type,
            0x4a => At::UseLocation,
            0x4b => At::VariableParameter,
            0x4c => At::Virtuality,
            0x4d => At::VtableElemLocation,
            0x4e => At::Allocated,
            0x4f => At::Associated,
            0x50 => At::DataLocation,
            0x51 => At::ByteStride,
            0x52 => At::EntryPc,
            0x53 => At::UseUtf8,
            0x54 => At::Extension,
            0x55 => At::Ranges,
            0x56 => At::Trampoline,
            0x57 => At::CallColumn,
            0x58 => At::CallFile,
            0x59 => At::CallLine,
            0x5a => At::Description,
            0x61 => At::Mutable,
            0x62 => At::ThreadsScaled,
            0x63 => At::Explicit,
            0x64 => At::ObjectPointer,
            0x65 => At::Endianity,
            0x66 => At::Elemental,
            0x67 => At::Pure,
            0x68 => At::Recursive,
            0x69 => At::Signature,
            0x6a => At::MainSubprogram,
            0x6b => At::DataBitOffset,
            0x6c => At::ConstExpr,
            0x6d => At::EnumClass,
            0x6e => At::LinkageName,
            0x72 => At::StrOffsetsBase,
            0x73 => At::AddrBase,
            0x74 => At::RnglistsBase,
            0x76 => At::DwoName,
            0x77 => At::Reference,
            0x78 => At::RvalueReference,
            0x79 => At::Macros,
            0x7a => At::CallAllCalls,
            0x7b => At::CallAllSourceCalls,
            0x7c => At::CallAllTailCalls,
            0x7d => At::CallReturnPc,
            0x7e => At::CallValue,
            0x7f => At::CallOrigin,
            0x80 => At::CallParameter,
            0x81 => At::CallPc,
            0x82 => At::CallTailCall,
            0x83 => At::CallTarget,
            0x84 => At::CallTargetClobbered,
            0x85 => At::CallDataLocation,
            0x86 => At::CallDataValue,
            0x87 => At::Noreturn,
            0x88 => At::Alignment,
            0x89 => At::ExportSymbols,
            0x8a => At::Deleted,
            0x8b => At::Defaulted,
            0x8c => At::LoclistsBase,
            0x2007 => At::MipsLinkageName,
            0x3fe1 => At::AppleOptimized,
            0x3fe2 => At::AppleFlags,
            0x3fe3 => At::AppleIsa,
            0x3fe4 => At::AppleBlock,
            0x3fe5 => At::AppleMajorRuntimeVers,
            0x3fe6 => At::AppleRuntimeClass,
            0x3fe7 => At::AppleOmitFramePtr,
            0x3fe8 => At::ApplePropertyName,
            0x3fe9 => At::ApplePropertyGetter,
            0x3fea => At::ApplePropertySetter,
            0x3feb => At::ApplePropertyAttribute,
            0x3fec => At::AppleObjcCompleteType,
            0x3fed => At::AppleProperty,
            0x3fee => At::AppleObjcDirect,
            0x3fef => At::AppleSdk,
            other => At::Unknown(other as u16),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            At::None => 0x00,
            At::Sibling => 0x01,
            At::Location => 0x02,
            At::Name => 0x03,
            At::Ordering => 0x09,
            At::ByteSize => 0x0b,
            At::BitOffset => 0x0c,
            At::BitSize => 0x0d,
            At::StmtList => 0x10,
            At::LowPc => 0x11,
            At::HighPc => 0x12,
            At::Language => 0x13,
            At::Visibility => 0x17,
            At::Import => 0x18,
            At::StringLength => 0x19,
            At::CommonReference => 0x1a,
            At::CompDir => 0x1b,
            At::ConstValue => 0x1c,
            At::ContainingType => 0x1d,
            At::DefaultValue => 0x1e,
            At::Inline => 0x20,
            At::IsOptional => 0x21,
            At::LowerBound => 0x22,
            At::Producer => 0x25,
            At::Prototyped => 0x27,
            At::ReturnAddr => 0x2a,
            At::StartScope => 0x2c,
            At::BitStride => 0x2e,
            At::UpperBound => 0x2f,
            At::AbstractOrigin => 0x31,
            At::Accessibility => 0x32,
            At::AddressClass => 0x33,
            At::Artificial => 0x34,
            At::BaseTypes => 0x35,
            At::CallingConvention => 0x36,
            At::Count => 0x37,
            At::DataMemberLocation => 0x38,
            At::DeclColumn => 0x39,
            At::DeclFile => 0x3a,
            At::DeclLine => 0x3b,
            At::Declaration => 0x3c,
            At::DiscrList => 0x3d,
            At::Encoding => 0x3e,
            At::External => 0x3f,
            At::FrameBase => 0x40,
            At::Friend => 0x41,
            At::IdentifierCase => 0x42,
            At::MacroInfo => 0x43,
            At::NamelistItem => 0x44,
            At::Priority => 0x45,
            At::Segment => 0x46,
            At::Specification => 0x47,
            At::StaticLink => 0x48,
            At::Type => 0x49,
            At::UseLocation => 0x4a,
            At::VariableParameter => 0x4b,
            At::Virtuality => 0x4c,
            At::VtableElemLocation => 0x4d,
            At::Allocated => 0x4e,
            At::Associated => 0x4f,
            At::DataLocation => 0x50,
            At::ByteStride => 0x51,
            At::EntryPc => 0x52,
            At::UseUtf8 => 0x53,
            At::Extension => 0x54,
            At::Ranges => 0x55,
            At::Trampoline => 0x56,
            At::CallColumn => 0x57,
            At::CallFile => 0x58,
            At::CallLine => 0x59,
            At::Description => 0x5a,
            At::Mutable => 0x61,
            At::ThreadsScaled => 0x62,
            At::Explicit => 0x63,
            At::ObjectPointer => 0x64,
            At::Endianity => 0x65,
            At::Elemental => 0x66,
            At::Pure => 0x67,
            At::Recursive => 0x68,
            At::Signature => 0x69,
            At::MainSubprogram => 0x6a,
            At::DataBitOffset => 0x6b,
            At::ConstExpr => 0x6c,
            At::EnumClass => 0x6d,
            At::LinkageName => 0x6e,
            At::StrOffsetsBase => 0x72,
            At::AddrBase => 0x73,
            At::RnglistsBase => 0x74,
            At::DwoName => 0x76,
            At::Reference => 0x77,
            At::RvalueReference => 0x78,
            At::Macros => 0x79,
            At::CallAllCalls => 0x7a,
            At::CallAllSourceCalls => 0x7b,
            At::CallAllTailCalls => 0x7c,
            At::CallReturnPc => 0x7d,
            At::CallValue => 0x7e,
            At::CallOrigin => 0x7f,
            At::CallParameter => 0x80,
            At::CallPc => 0x81,
            At::CallTailCall => 0x82,
            At::CallTarget => 0x83,
            At::CallTargetClobbered => 0x84,
            At::CallDataLocation => 0x85,
            At::CallDataValue => 0x86,
            At::Noreturn => 0x87,
            At::Alignment => 0x88,
            At::ExportSymbols => 0x89,
            At::Deleted => 0x8a,
            At::Defaulted => 0x8b,
            At::LoclistsBase => 0x8c,
            At::MipsLinkageName => 0x2007,
            At::AppleOptimized => 0x3fe1,
            At::AppleFlags => 0x3fe2,
            At::AppleIsa => 0x3fe3,
            At::AppleBlock => 0x3fe4,
            At::AppleMajorRuntimeVers => 0x3fe5,
            At::AppleRuntimeClass => 0x3fe6,
            At::AppleOmitFramePtr => 0x3fe7,
            At::ApplePropertyName => 0x3fe8,
            At::ApplePropertyGetter => 0x3fe9,
            At::ApplePropertySetter => 0x3fea,
            At::ApplePropertyAttribute => 0x3feb,
            At::AppleObjcCompleteType => 0x3fec,
            At::AppleProperty => 0x3fed,
            At::AppleObjcDirect => 0x3fee,
            At::AppleSdk => 0x3fef,
            At::Unknown(v) => *v as u32,
        }
    }
}

impl fmt::Display for At {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            At::None => "none",
            At::Sibling => "sibling",
            At::Location => "location",
            At::Name => "name",
            At::Ordering => "ordering",
            At::ByteSize => "byte_size",
            At::BitOffset => "bit_offset",
            At::BitSize => "bit_size",
            At::StmtList => "stmt_list",
            At::LowPc => "low_pc",
            At::HighPc => "high_pc",
            At::Language => "language",
            At::Visibility => "visibility",
            At::Import => "import",
            At::StringLength => "string_length",
            At::CommonReference => "common_reference",
            At::CompDir => "comp_dir",
            At::ConstValue => "const_value",
            At::ContainingType => "containing_type",
            At::DefaultValue => "default_value",
            At::Inline => "inline",
            At::IsOptional => "is_optional",
            At::LowerBound => "lower_bound",
            At::Producer => "producer",
            At::Prototyped => "prototyped",
            At::ReturnAddr => "return_addr",
            At::StartScope => "start_scope",
            At::BitStride => "bit_stride",
            At::UpperBound => "upper_bound",
            At::AbstractOrigin => "abstract_origin",
            At::Accessibility => "accessibility",
            At::AddressClass => "address_class",
            At::Artificial => "artificial",
            At::BaseTypes => "base_types",
            At::CallingConvention => "calling_convention",
            At::Count => "count",
            At::DataMemberLocation => "data_member_location",
            At::DeclColumn => "decl_column",
            At::DeclFile => "decl_file",
            At::DeclLine => "decl_line",
            At::Declaration => "declaration",
            At::DiscrList => "discr_list",
            At::Encoding => "encoding",
            At::External => "external",
            At::FrameBase => "frame_base",
            At::Friend => "friend",
            At::IdentifierCase => "identifier_case",
            At::MacroInfo => "macro_info",
            At::NamelistItem => "namelist_item",
            At::Priority => "priority",
            At::Segment => "segment",
            At::Specification => "specification",
            At::StaticLink => "static_link",
            At::Type => "type",
            At::UseLocation => "use_location",
            At::VariableParameter => "variable_parameter",
            At::Virtuality => "virtuality",
            At::VtableElemLocation => "vtable_elem_location",
            At::Allocated => "allocated",
            At::Associated => "associated",
            At::DataLocation => "data_location",
            At::ByteStride => "byte_stride",
            At::EntryPc => "entry_pc",
            At::UseUtf8 => "use_UTF8",
            At::Extension => "extension",
            At::Ranges => "ranges",
            At::Trampoline => "trampoline",
            At::CallColumn => "call_column",
            At::CallFile => "call_file",
            At::CallLine => "call_line",
            At::Description => "description",
            At::Mutable => "mutable",
            At::ThreadsScaled => "threads_scaled",
            At::Explicit => "explicit",
            At::ObjectPointer => "object_pointer",
            At::Endianity => "endianity",
            At::Elemental => "elemental",
            At::Pure => "pure",
            At::Recursive => "recursive",
            At::Signature => "signature",
            At::MainSubprogram => "main_subprogram",
            At::DataBitOffset => "data_bit_offset",
            At::ConstExpr => "const_expr",
            At::EnumClass => "enum_class",
            At::LinkageName => "linkage_name",
            At::StrOffsetsBase => "str_offsets_base",
            At::AddrBase => "addr_base",
            At::RnglistsBase => "rnglists_base",
            At::DwoName => "dwo_name",
            At::Reference => "reference",
            At::RvalueReference => "rvalue_reference",
            At::Macros => "macros",
            At::CallAllCalls => "call_all_calls",
            At::CallAllSourceCalls => "call_all_source_calls",
            At::CallAllTailCalls => "call_all_tail_calls",
            At::CallReturnPc => "call_return_pc",
            At::CallValue => "call_value",
            At::CallOrigin => "call_origin",
            At::CallParameter => "call_parameter",
            At::CallPc => "call_pc",
            At::CallTailCall => "call_tail_call",
            At::CallTarget => "call_target",
            At::CallTargetClobbered => "call_target_clobbered",
            At::CallDataLocation => "call_data_location",
            At::CallDataValue => "call_data_value",
            At::Noreturn => "noreturn",
            At::Alignment => "alignment",
            At::ExportSymbols => "export_symbols",
            At::Deleted => "deleted",
            At::Defaulted => "defaulted",
            At::LoclistsBase => "loclists_base",
            At::MipsLinkageName => "MIPS_linkage_name",
            At::AppleOptimized => "APPLE_optimized",
            At::AppleFlags => "APPLE_flags",
            At::AppleIsa => "APPLE_isa",
            At::AppleBlock => "APPLE_block",
            At::AppleMajorRuntimeVers => "APPLE_major_runtime_vers",
            At::AppleRuntimeClass => "APPLE_runtime_class",
            At::AppleOmitFramePtr => "APPLE_omit_frame_ptr",
            At::ApplePropertyName => "APPLE_property_name",
            At::ApplePropertyGetter => "APPLE_property_getter",
            At::ApplePropertySetter => "APPLE_property_setter",
            At::ApplePropertyAttribute => "APPLE_property_attribute",
            At::AppleObjcCompleteType => "APPLE_objc_complete_type",
            At::AppleProperty => "APPLE_property",
            At::AppleObjcDirect => "APPLE_objc_direct",
            At::AppleSdk => "APPLE_sdk",
            At::Unknown(v) => return write!(f, "at_{:#06x}", v),
        };
        f.write_str(name)
    }
}

/// DWARF attribute forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    Addr,
    Block2,
    Block4,
    Data2,
    Data4,
    Data8,
    String,
    Block,
    Block1,
    Data1,
    Flag,
    Sdata,
    Strp,
    Udata,
    RefAddr,
    Ref1,
    Ref2,
    Ref4,
    Ref8,
    RefUdata,
    Indirect,
    SecOffset,
    Exprloc,
    FlagPresent,
    Strx,
    Addrx,
    RefSup4,
    StrpSup,
    Data16,
    LineStrp,
    RefSig8,
    ImplicitConst,
    Loclistx,
    Rnglistx,
    RefSup8,
    Strx1,
    Strx2,
    Strx3,
    Strx4,
    Addrx1,
    Addrx2,
    Addrx3,
    Addrx4,
    Unknown(u16),
}

impl Form {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0x01 => Form::Addr,
            0x03 => Form::Block2,
            0x04 => Form::Block4,
            0x05 => Form::Data2,
            0x06 => Form::Data4,
            0x07 => Form::Data8,
            0x08 => Form::String,
            0x09 => Form::Block,
            0x0a => Form::Block1,
            0x0b => Form::Data1,
            0x0c => Form::Flag,
            0x0d => Form::Sdata,
            0x0e => Form::Strp,
            0x0f => Form::Udata,
            0x10 => Form::RefAddr,
            0x11 => Form::Ref1,
            0x12 => Form::Ref2,
            0x13 => Form::Ref4,
            0x14 => Form::Ref8,
            0x15 => Form::RefUdata,
            0x16 => Form::Indirect,
            0x17 => Form::SecOffset,
            0x18 => Form::Exprloc,
            0x19 => Form::FlagPresent,
            0x1a => Form::Strx,
            0x1b => Form::Addrx,
            0x1c => Form::RefSup4,
            0x1d => Form::StrpSup,
            0x1e => Form::Data16,
            0x1f => Form::LineStrp,
            0x20 => Form::RefSig8,
            0x21 => Form::ImplicitConst,
            0x22 => Form::Loclistx,
            0x23 => Form::Rnglistx,
            0x24 => Form::RefSup8,
            0x25 => Form::Strx1,
            0x26 => Form::Strx2,
            0x27 => Form::Strx3,
            0x28 => Form::Strx4,
            0x29 => Form::Addrx1,
            0x2a => Form::Addrx2,
            0x2b => Form::Addrx3,
            0x2c => Form::Addrx4,
            other => Form::Unknown(other as u16),
        }
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Form::Unknown(v) => write!(f, "form_{:#06x}", v),
            other => write!(f, "{}", format!("{:?}", other).to_lowercase()),
        }
    }
}

/// Target architecture of a Mach-O image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    Unknown,
    X86,
    X86_64,
    Arm,
    Arm64,
    Arm64_32,
}

impl Arch {
    pub fn code(&self) -> u64 {
        match self {
            Arch::Unknown => 0,
            Arch::X86 => 1,
            Arch::X86_64 => 2,
            Arch::Arm => 3,
            Arch::Arm64 => 4,
            Arch::Arm64_32 => 5,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Arch::Unknown => "unknown",
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
            Arch::Arm64_32 => "arm64_32",
        };
        f.write_str(name)
    }
}

/// Attributes whose disagreement does not constitute an ODR violation:
/// source-location noise, addresses that legitimately vary by link, and
/// debugger-only bookkeeping. This table is load-bearing for the
/// false-positive rate; extend it with care.
pub fn nonfatal_attribute(at: At) -> bool {
    matches!(
        at,
        At::DeclColumn
            | At::DeclFile
            | At::DeclLine
            | At::CallColumn
            | At::CallFile
            | At::CallLine
            | At::CallOrigin
            | At::CallReturnPc
            | At::LowPc
            | At::HighPc
            | At::EntryPc
            | At::Ranges
            | At::Location
            | At::FrameBase
            | At::Sibling
            | At::StmtList
            | At::CompDir
            | At::Producer
            | At::MacroInfo
            | At::Macros
            | At::StrOffsetsBase
            | At::AddrBase
            | At::RnglistsBase
            | At::LoclistsBase
            | At::DwoName
            | At::AppleOptimized
            | At::AppleFlags
            | At::AppleIsa
            | At::AppleBlock
            | At::AppleMajorRuntimeVers
            | At::AppleRuntimeClass
            | At::AppleOmitFramePtr
            | At::ApplePropertyName
            | At::ApplePropertyGetter
            | At::ApplePropertySetter
            | At::ApplePropertyAttribute
            | At::AppleObjcCompleteType
            | At::AppleProperty
            | At::AppleObjcDirect
            | At::AppleSdk
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_from_u32() {
        assert_eq!(Tag::from_u32(0x11), Tag::CompileUnit);
        assert_eq!(Tag::from_u32(0x2e), Tag::Subprogram);
        assert_eq!(Tag::from_u32(0x13), Tag::StructureType);
        assert!(matches!(Tag::from_u32(0x7777), Tag::Unknown(0x7777)));
    }

    #[test]
    fn test_tag_code_roundtrip() {
        for code in [0x01u32, 0x0d, 0x11, 0x13, 0x24, 0x2e, 0x39, 0x4200] {
            assert_eq!(Tag::from_u32(code).code(), code);
        }
    }

    #[test]
    fn test_at_from_u32() {
        assert_eq!(At::from_u32(0x03), At::Name);
        assert_eq!(At::from_u32(0x49), At::Type);
        assert_eq!(At::from_u32(0x3b), At::DeclLine);
        assert_eq!(At::from_u32(0x3fef), At::AppleSdk);
        assert!(matches!(At::from_u32(0x9999), At::Unknown(0x9999)));
    }

    #[test]
    fn test_form_from_u32() {
        assert_eq!(Form::from_u32(0x08), Form::String);
        assert_eq!(Form::from_u32(0x0e), Form::Strp);
        assert_eq!(Form::from_u32(0x13), Form::Ref4);
        assert_eq!(Form::from_u32(0x21), Form::ImplicitConst);
        assert!(matches!(Form::from_u32(0x7f), Form::Unknown(0x7f)));
    }

    #[test]
    fn test_display_names_for_categories() {
        assert_eq!(Tag::Subprogram.to_string(), "subprogram");
        assert_eq!(Tag::StructureType.to_string(), "structure_type");
        assert_eq!(At::Type.to_string(), "type");
        assert_eq!(At::ByteSize.to_string(), "byte_size");
    }

    #[test]
    fn test_nonfatal_attributes() {
        assert!(nonfatal_attribute(At::DeclLine));
        assert!(nonfatal_attribute(At::DeclFile));
        assert!(nonfatal_attribute(At::DeclColumn));
        assert!(nonfatal_attribute(At::LowPc));
        assert!(nonfatal_attribute(At::HighPc));
        assert!(nonfatal_attribute(At::Ranges));
        assert!(nonfatal_attribute(At::Location));
        assert!(nonfatal_attribute(At::AppleSdk));

        assert!(!nonfatal_attribute(At::Type));
        assert!(!nonfatal_attribute(At::Name));
        assert!(!nonfatal_attribute(At::ByteSize));
        assert!(!nonfatal_attribute(At::External));
        assert!(!nonfatal_attribute(At::DataMemberLocation));
    }
}

//! Scalar type table.
//!
//! Maps canonical source scalar spellings to ctypes identifiers. The
//! table is keyed on normalized spellings (see [`crate::clean`]), so
//! `"const unsigned int"` and `"unsigned int"` land on the same row.

/// The full (source spelling, ctypes identifier) mapping.
///
/// A few rows are pointer conveniences in their own right (`void*`,
/// `char*`, `std::string`); everything else is a plain scalar.
pub const SCALAR_TABLE: &[(&str, &str)] = &[
    ("void*", "c_void_p"),
    ("bool", "c_bool"),
    ("char*", "c_char_p"),
    ("std::string", "c_char_p"),
    ("char", "c_char"),
    ("wchar_t", "c_wchar"),
    ("unsigned char", "c_ubyte"),
    ("short", "c_short"),
    ("unsigned short", "c_ushort"),
    ("int", "c_int"),
    ("unsigned int", "c_uint"),
    ("long", "c_long"),
    ("unsigned long", "c_ulong"),
    ("long long", "c_longlong"),
    ("unsigned long long", "c_ulonglong"),
    ("float", "c_float"),
    ("double", "c_double"),
    ("long double", "c_longdouble"),
    ("short int", "c_short"),
    ("unsigned short int", "c_ushort"),
    ("short unsigned int", "c_ushort"),
    ("long int", "c_long"),
    ("unsigned long int", "c_ulong"),
    ("long unsigned int", "c_ulong"),
    ("long long int", "c_longlong"),
    ("unsigned long long int", "c_ulonglong"),
    ("long long unsigned int", "c_ulonglong"),
    ("long unsigned long int", "c_ulonglong"),
    ("int8_t", "c_int8"),
    ("uint8_t", "c_uint8"),
    ("int16_t", "c_int16"),
    ("uint16_t", "c_uint16"),
    ("int32_t", "c_int32"),
    ("uint32_t", "c_uint32"),
    ("int64_t", "c_int64"),
    ("uint64_t", "c_uint64"),
    ("intptr_t", "c_int"),
    ("uintptr_t", "c_uint"),
    ("int_fast8_t", "c_int"),
    ("int_fast16_t", "c_int"),
    ("int_fast32_t", "c_int"),
    ("int_fast64_t", "c_int64"),
    ("uint_fast8_t", "c_uint"),
    ("uint_fast16_t", "c_uint"),
    ("uint_fast32_t", "c_uint"),
    ("uint_fast64_t", "c_uint64"),
    ("int_least8_t", "c_int"),
    ("int_least16_t", "c_int"),
    ("int_least32_t", "c_int"),
    ("int_least64_t", "c_int64"),
    ("uint_least8_t", "c_uint"),
    ("uint_least16_t", "c_uint"),
    ("uint_least32_t", "c_uint"),
    ("uint_least64_t", "c_uint64"),
    ("intmax_t", "c_int64"),
    ("uintmax_t", "c_uint64"),
];

/// Look up the ctypes identifier for a normalized scalar spelling.
pub fn scalar_target(spelling: &str) -> Option<&'static str> {
    SCALAR_TABLE
        .iter()
        .find(|(src, _)| *src == spelling)
        .map(|(_, tgt)| *tgt)
}

/// The pointer-to-scalar convenience alias, if the target provides one.
///
/// `ctypes` ships dedicated pointer types for exactly these scalars;
/// everything else goes through the generic `POINTER(...)` composite.
pub fn pointer_alias(ctype: &str) -> Option<&'static str> {
    match ctype {
        "c_char" => Some("c_char_p"),
        "c_wchar" => Some("c_wchar_p"),
        _ => None,
    }
}

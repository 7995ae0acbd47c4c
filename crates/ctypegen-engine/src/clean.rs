//! Type spelling normalization.
//!
//! Raw spellings arrive the way the front end recorded them:
//! `"const ::std::string &"`, `"Node *"`, `"int&&"`. Normalization
//! produces the canonical form the scalar table and registry are
//! keyed on. The transformation is pure and idempotent.

/// Normalize a raw type spelling.
///
/// Steps, in order:
/// 1. strip a leading `::` scope qualifier,
/// 2. drop `const` wherever it appears as a standalone word,
/// 3. collapse whitespace immediately before `*` and `&`,
/// 4. collapse runs of two or more `&` into a single space,
/// 5. trim surrounding whitespace.
///
/// Empty input is returned unchanged.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let s = raw.strip_prefix("::").unwrap_or(raw);
    let s = drop_const_words(s);
    let s = collapse_markers(&s);
    s.trim().to_string()
}

/// Remove every standalone `const` word, along with trailing whitespace.
fn drop_const_words(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if s[i..].starts_with("const")
            && boundary_before(bytes, i)
            && boundary_after(bytes, i + 5)
        {
            i += 5;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
        } else {
            // Advance one full UTF-8 character.
            let ch = s[i..].chars().next().unwrap_or('\0');
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    out
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn boundary_before(bytes: &[u8], i: usize) -> bool {
    i == 0 || !is_word_byte(bytes[i - 1])
}

fn boundary_after(bytes: &[u8], i: usize) -> bool {
    i >= bytes.len() || !is_word_byte(bytes[i])
}

/// Remove whitespace before `*`/`&` and collapse `&&`-runs to a space.
fn collapse_markers(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '*' | '&' => {
                while out.ends_with(|w: char| w.is_whitespace()) {
                    out.pop();
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    // A run of two or more `&` degrades to a plain separator.
    let mut collapsed = String::with_capacity(out.len());
    let mut amp_run = 0usize;
    for c in out.chars() {
        if c == '&' {
            amp_run += 1;
            continue;
        }
        flush_amp_run(&mut collapsed, amp_run);
        amp_run = 0;
        collapsed.push(c);
    }
    flush_amp_run(&mut collapsed, amp_run);
    collapsed
}

fn flush_amp_run(out: &mut String, run: usize) {
    match run {
        0 => {}
        1 => out.push('&'),
        _ => out.push(' '),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scope_qualifier() {
        assert_eq!(normalize("::std::string"), "std::string");
        // Only a leading qualifier is stripped.
        assert_eq!(normalize("std::string"), "std::string");
    }

    #[test]
    fn drops_standalone_const() {
        assert_eq!(normalize("const char*"), "char*");
        assert_eq!(normalize("const std::string&"), "std::string&");
        assert_eq!(normalize("char const"), "char");
    }

    #[test]
    fn const_inside_words_survives() {
        assert_eq!(normalize("constant_pool"), "constant_pool");
        assert_eq!(normalize("my_const"), "my_const");
    }

    #[test]
    fn collapses_space_before_markers() {
        assert_eq!(normalize("Node *"), "Node*");
        assert_eq!(normalize("char * *"), "char**");
        assert_eq!(normalize("int &"), "int&");
    }

    #[test]
    fn collapses_repeated_references() {
        assert_eq!(normalize("int&&"), "int");
        assert_eq!(normalize("std::string &&"), "std::string");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(normalize("  unsigned int  "), "unsigned int");
    }

    #[test]
    fn empty_input_unchanged() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn idempotent() {
        for raw in [
            "const ::std::string &",
            "Node *",
            "int&&",
            "unsigned long long",
            "char* *",
            "void*",
            "",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }
}

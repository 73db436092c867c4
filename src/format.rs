// Consumer-side rendering of the `{}` placeholder mini-language

use crate::record::ArgSlot;
use std::fmt::Write;

/// Render `fmt` with `args` appended to `out`.
///
/// Rules:
/// - `{}` consumes the next argument
/// - `{{` and `}}` are literal braces
/// - a lone `{` or `}` is copied verbatim
/// - `{}` past the last argument renders the two literal characters
/// - surplus arguments are ignored
pub(crate) fn render_into(out: &mut String, fmt: &str, args: &[ArgSlot]) {
    let bytes = fmt.as_bytes();
    let mut i = 0;
    let mut next_arg = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if matches!(bytes.get(i + 1), Some(&b'{')) => {
                out.push('{');
                i += 2;
            }
            b'{' if matches!(bytes.get(i + 1), Some(&b'}')) => {
                match args.get(next_arg) {
                    Some(slot) => {
                        render_arg(out, slot);
                        next_arg += 1;
                    }
                    None => out.push_str("{}"),
                }
                i += 2;
            }
            b'}' if matches!(bytes.get(i + 1), Some(&b'}')) => {
                out.push('}');
                i += 2;
            }
            _ => {
                // Copy the run up to the next brace in one go. A lone
                // brace lands here too and is copied verbatim.
                let start = i;
                while i < bytes.len() && bytes[i] != b'{' && bytes[i] != b'}' {
                    i += 1;
                }
                if i == start {
                    i += 1;
                }
                out.push_str(&fmt[start..i]);
            }
        }
    }
}

fn render_arg(out: &mut String, slot: &ArgSlot) {
    match slot {
        ArgSlot::U64(v) => {
            let _ = write!(out, "{}", v);
        }
        ArgSlot::F64(v) => render_f64(out, *v),
        // SAFETY: the caller contract on StrView guarantees the bytes are
        // still valid at format time.
        ArgSlot::Str(view) => out.push_str(unsafe { view.as_str() }),
    }
}

/// Non-integer values carry at least this many significant digits.
const MIN_FLOAT_SIG_DIGITS: usize = 6;

/// Render a float with a dot separator and, for non-integers, at least
/// six significant digits. Shorter round-trip renderings are padded with
/// trailing decimal places; longer ones keep every digit they need.
fn render_f64(out: &mut String, v: f64) {
    let shortest = format!("{}", v);
    if !v.is_finite() || v.fract() == 0.0 {
        out.push_str(&shortest);
        return;
    }
    if significant_digits(&shortest) >= MIN_FLOAT_SIG_DIGITS {
        out.push_str(&shortest);
        return;
    }

    // f64 Display always renders finite non-integers as "<int>.<frac>",
    // so the dot is present and indexing around it is safe.
    let digits = shortest.trim_start_matches('-');
    let dot = digits.find('.').unwrap_or(digits.len());
    let int_part = &digits[..dot];
    let decimals = if int_part == "0" {
        // Leading fractional zeros are not significant; pad past them.
        let frac = &digits[dot + 1..];
        let leading_zeros = frac.chars().take_while(|&c| c == '0').count();
        leading_zeros + MIN_FLOAT_SIG_DIGITS
    } else {
        MIN_FLOAT_SIG_DIGITS.saturating_sub(int_part.len())
    };
    let _ = write!(out, "{:.*}", decimals, v);
}

fn significant_digits(rendered: &str) -> usize {
    rendered
        .chars()
        .filter(char::is_ascii_digit)
        .skip_while(|&c| c == '0')
        .count()
}

/// Truncate `out` to at most `max` bytes, backing off to a UTF-8 char
/// boundary so the result stays valid text.
pub(crate) fn truncate_to_boundary(out: &mut String, max: usize) {
    if out.len() <= max {
        return;
    }
    let mut end = max;
    while end > 0 && !out.is_char_boundary(end) {
        end -= 1;
    }
    out.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LogArg;

    fn render(fmt: &str, args: &[ArgSlot]) -> String {
        let mut out = String::new();
        render_into(&mut out, fmt, args);
        out
    }

    #[test]
    fn test_placeholders_in_order() {
        let args = [1u32.as_slot(), 2u32.as_slot(), 3u32.as_slot()];
        assert_eq!(render("{} {} {}", &args), "1 2 3");
    }

    #[test]
    fn test_integer_rendering() {
        assert_eq!(render("Test {}", &[42u32.as_slot()]), "Test 42");
        assert_eq!(
            render("max {}", &[u64::MAX.as_slot()]),
            "max 18446744073709551615"
        );
    }

    #[test]
    fn test_float_rendering() {
        assert_eq!(
            render("Number: {}", &[1.234f64.as_slot()]),
            "Number: 1.23400"
        );
        assert_eq!(render("{}", &[0.5f64.as_slot()]), "0.500000");
    }

    #[test]
    fn test_float_six_significant_digit_floor() {
        // Padded up to six significant digits, counting from the first
        // non-zero digit.
        assert_eq!(render("{}", &[0.5f64.as_slot()]), "0.500000");
        assert_eq!(render("{}", &[1.234f64.as_slot()]), "1.23400");
        assert_eq!(render("{}", &[10.5f64.as_slot()]), "10.5000");
        assert_eq!(render("{}", &[0.0625f64.as_slot()]), "0.0625000");
    }

    #[test]
    fn test_float_longer_than_floor_keeps_digits() {
        assert_eq!(render("{}", &[1.2345678f64.as_slot()]), "1.2345678");
        assert_eq!(render("{}", &[123456.75f64.as_slot()]), "123456.75");
    }

    #[test]
    fn test_integer_valued_floats_stay_short() {
        assert_eq!(render("{}", &[3.0f64.as_slot()]), "3");
        assert_eq!(render("{}", &[(-2.0f64).as_slot()]), "-2");
    }

    #[test]
    fn test_string_rendering() {
        assert_eq!(render("Hello {}", &["world".as_slot()]), "Hello world");
    }

    #[test]
    fn test_escaped_braces() {
        assert_eq!(render("{{}}", &[]), "{}");
        assert_eq!(render("{{{}}}", &[5u32.as_slot()]), "{5}");
    }

    #[test]
    fn test_lone_braces_verbatim() {
        assert_eq!(render("a { b", &[]), "a { b");
        assert_eq!(render("a } b", &[]), "a } b");
        assert_eq!(render("tail {", &[]), "tail {");
        assert_eq!(render("tail }", &[]), "tail }");
    }

    #[test]
    fn test_surplus_placeholders_render_literally() {
        assert_eq!(render("{} {}", &[1u32.as_slot()]), "1 {}");
        assert_eq!(render("{}", &[]), "{}");
    }

    #[test]
    fn test_surplus_arguments_ignored() {
        let args = [1u32.as_slot(), 2u32.as_slot()];
        assert_eq!(render("only {}", &args), "only 1");
    }

    #[test]
    fn test_no_placeholders() {
        assert_eq!(render("plain message", &[]), "plain message");
    }

    #[test]
    fn test_full_argument_load() {
        let args: Vec<ArgSlot> = (1..=8u32).map(|i| i.as_slot()).collect();
        assert_eq!(
            render("{}{}{}{}{}{}{}{}", &args),
            "12345678",
            "all eight slots render"
        );
    }

    #[test]
    fn test_mixed_types_one_line() {
        let args = [42u64.as_slot(), 0.25f64.as_slot(), "mid".as_slot()];
        assert_eq!(
            render("a={} b={} c={} end", &args),
            "a=42 b=0.250000 c=mid end"
        );
    }

    #[test]
    fn test_truncate_ascii() {
        let mut s = String::from("abcdefgh");
        truncate_to_boundary(&mut s, 5);
        assert_eq!(s, "abcde");
    }

    #[test]
    fn test_truncate_backs_off_multibyte() {
        // 'é' is two bytes; cutting at 3 would split it.
        let mut s = String::from("abé");
        truncate_to_boundary(&mut s, 3);
        assert_eq!(s, "ab");
    }

    #[test]
    fn test_truncate_noop_when_short() {
        let mut s = String::from("ok");
        truncate_to_boundary(&mut s, 10);
        assert_eq!(s, "ok");
    }
}

//! Formatting for `$display` and `$write` argument lists.
//!
//! A leading string-literal argument acts as a format; `%d`, `%b`, `%o`,
//! `%h`/`%x`, `%s`, and `%%` are recognized. Without a format, every
//! argument prints in decimal. A conversion with no remaining argument
//! formats as zero.

use crate::evaluator::{EvalContext, ValueStore};
use tempo_ast::{Node, NodeId};
use tempo_common::Bits;

/// Formats a system-task argument list into its output text.
pub fn format(ctx: &EvalContext<'_>, store: &ValueStore, args: &[NodeId]) -> String {
    let mut out = String::new();
    let Some((&first, rest)) = args.split_first() else {
        return out;
    };
    if let Node::StringLit { value } = ctx.module.node(first) {
        let fmt = value.clone();
        apply_format(ctx, store, &fmt, rest, &mut out);
    } else {
        for &arg in args {
            push_plain(ctx, store, arg, &mut out);
        }
    }
    out
}

fn apply_format(
    ctx: &EvalContext<'_>,
    store: &ValueStore,
    fmt: &str,
    args: &[NodeId],
    out: &mut String,
) {
    let mut args = args.iter();
    let mut chars = fmt.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some('s') => match args.next() {
                Some(&arg) => push_plain(ctx, store, arg, out),
                None => out.push('0'),
            },
            Some(code @ ('d' | 'b' | 'o' | 'h' | 'x')) => {
                let value = match args.next() {
                    Some(&arg) => ctx.eval(store, arg),
                    None => Bits::new(1),
                };
                push_radix(&value, code, out);
            }
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
}

fn push_plain(ctx: &EvalContext<'_>, store: &ValueStore, arg: NodeId, out: &mut String) {
    if let Node::StringLit { value } = ctx.module.node(arg) {
        out.push_str(value);
    } else {
        push_radix(&ctx.eval(store, arg), 'd', out);
    }
}

fn push_radix(value: &Bits, code: char, out: &mut String) {
    match code {
        'b' => {
            let width = value.width().max(1);
            for i in (0..width).rev() {
                let bit = i < value.width() && value.get(i);
                out.push(if bit { '1' } else { '0' });
            }
        }
        'o' => push_grouped(value, 3, out),
        'h' | 'x' => push_grouped(value, 4, out),
        _ => out.push_str(&value.to_u64().to_string()),
    }
}

fn push_grouped(value: &Bits, group: u32, out: &mut String) {
    let digits = value.width().div_ceil(group).max(1);
    for d in (0..digits).rev() {
        let mut v = 0u32;
        for i in (0..group).rev() {
            let idx = d * group + i;
            v = (v << 1) | u32::from(idx < value.width() && value.get(idx));
        }
        out.push(char::from_digit(v, 16).unwrap_or('0'));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Resolutions;
    use tempo_ast::{ModuleBuilder, ModuleDecl};

    fn render(build: impl FnOnce(&mut ModuleBuilder) -> Vec<NodeId>) -> String {
        let mut b = ModuleBuilder::new("m");
        let args = build(&mut b);
        let m: ModuleDecl = b.build();
        let resolve = Resolutions::build(&m).unwrap();
        let store = ValueStore::build(&m);
        let ctx = EvalContext {
            module: &m,
            resolve: &resolve,
        };
        format(&ctx, &store, &args)
    }

    #[test]
    fn plain_text_passthrough() {
        let s = render(|b| vec![b.string("hello world")]);
        assert_eq!(s, "hello world");
    }

    #[test]
    fn decimal_conversion() {
        let s = render(|b| {
            let fmt = b.string("value = %d");
            let n = b.number(42, 8);
            vec![fmt, n]
        });
        assert_eq!(s, "value = 42");
    }

    #[test]
    fn binary_conversion_pads_width() {
        let s = render(|b| {
            let fmt = b.string("%b");
            let n = b.number(0b101, 5);
            vec![fmt, n]
        });
        assert_eq!(s, "00101");
    }

    #[test]
    fn hex_and_octal() {
        let s = render(|b| {
            let fmt = b.string("%h %o");
            let a = b.number(0xBEEF, 16);
            let o = b.number(0o17, 6);
            vec![fmt, a, o]
        });
        assert_eq!(s, "beef 17");
    }

    #[test]
    fn percent_escape() {
        let s = render(|b| vec![b.string("100%%")]);
        assert_eq!(s, "100%");
    }

    #[test]
    fn string_conversion() {
        let s = render(|b| {
            let fmt = b.string("%s!");
            let arg = b.string("ok");
            vec![fmt, arg]
        });
        assert_eq!(s, "ok!");
    }

    #[test]
    fn missing_argument_formats_zero() {
        let s = render(|b| vec![b.string("%d")]);
        assert_eq!(s, "0");
    }

    #[test]
    fn bare_value_prints_decimal() {
        let s = render(|b| vec![b.number(7, 4)]);
        assert_eq!(s, "7");
    }

    #[test]
    fn empty_args_empty_string() {
        let s = render(|_| Vec::new());
        assert_eq!(s, "");
    }

    #[test]
    fn unknown_conversion_passes_through() {
        let s = render(|b| vec![b.string("%q")]);
        assert_eq!(s, "%q");
    }
}

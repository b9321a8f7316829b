//! Message formatting with a hard size cap.
//!
//! Every thread formats into its own scratch buffer, so concurrent callers never
//! see each other's text. Output longer than the capacity is cut at the last
//! character boundary that fits; overflow is not an error.

use std::cell::RefCell;
use std::fmt::{self, Display, Write};

/// Maximum size in bytes of a formatted message.
pub const FORMAT_CAPACITY: usize = 4096;

thread_local! {
    static SCRATCH: RefCell<BoundedBuf> = RefCell::new(BoundedBuf::new(FORMAT_CAPACITY));
}

/// A `fmt::Write` target that silently stops accepting input at `capacity` bytes.
#[derive(Debug)]
pub struct BoundedBuf {
    buf: String,
    capacity: usize,
    truncated: bool,
}

impl BoundedBuf {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            capacity,
            truncated: false,
        }
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.truncated = false;
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// True once any input had to be dropped.
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl Write for BoundedBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.capacity - self.buf.len();
        if s.len() <= room {
            self.buf.push_str(s);
            return Ok(());
        }

        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.buf.push_str(&s[..cut]);
        self.truncated = true;
        // Returning Ok keeps Display impls from treating the cap as a failure
        Ok(())
    }
}

/// Formats `args` into at most [`FORMAT_CAPACITY`] bytes.
///
/// Usually reached through the [`format_bounded!`](crate::format_bounded) macro.
#[must_use]
pub fn format_bounded(args: fmt::Arguments<'_>) -> String {
    format_bounded_with(FORMAT_CAPACITY, args)
}

/// Same as [`format_bounded`] with an explicit capacity.
#[must_use]
pub fn format_bounded_with(capacity: usize, args: fmt::Arguments<'_>) -> String {
    if capacity != FORMAT_CAPACITY {
        return format_fresh(capacity, args);
    }

    SCRATCH.with(|cell| {
        // A Display impl that itself formats a log message lands here re-entrantly
        let Ok(mut scratch) = cell.try_borrow_mut() else {
            return format_fresh(capacity, args);
        };
        scratch.clear();
        let _ = scratch.write_fmt(args);
        scratch.as_str().to_owned()
    })
}

fn format_fresh(capacity: usize, args: fmt::Arguments<'_>) -> String {
    let mut buf = BoundedBuf::new(capacity);
    let _ = buf.write_fmt(args);
    buf.buf
}

/// Runtime-template formatting: each `{}` in `template` takes the next argument.
///
/// `{{` and `}}` produce literal braces. Surplus placeholders render as empty,
/// surplus arguments are ignored. Output is capped like [`format_bounded`].
#[must_use]
pub fn format_template(template: &str, args: &[&dyn Display]) -> String {
    format_bounded(format_args!("{}", TemplateArgs { template, args }))
}

struct TemplateArgs<'a> {
    template: &'a str,
    args: &'a [&'a dyn Display],
}

impl Display for TemplateArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut next = self.args.iter();
        let mut chars = self.template.char_indices().peekable();
        let mut start = 0;

        while let Some((i, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    f.write_str(&self.template[start..=i])?;
                    chars.next();
                    start = i + 2;
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    f.write_str(&self.template[start..=i])?;
                    chars.next();
                    start = i + 2;
                }
                '{' if matches!(chars.peek(), Some((_, '}'))) => {
                    f.write_str(&self.template[start..i])?;
                    chars.next();
                    start = i + 2;
                    if let Some(arg) = next.next() {
                        arg.fmt(f)?;
                    }
                }
                _ => {}
            }
        }

        f.write_str(&self.template[start..])
    }
}

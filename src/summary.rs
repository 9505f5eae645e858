//! Selects the part of a post body that becomes its summary, the short
//! excerpt shown on the landing page and other listings. Two boundary
//! policies exist: an explicit `<!-- more -->` marker in the body, which
//! wins when present, and a paragraph budget used for unannotated posts.

/// Marker that ends the summary when it appears in a body. Everything
/// before it, verbatim, is the summary input.
pub const MARKER: &str = "<!-- more -->";

/// Line-by-line paragraph budget. A paragraph is text separated by blank
/// lines, so a blank line closes a paragraph only when text preceded it;
/// once `remaining` reaches zero the budget is spent and no further lines
/// belong to the prefix.
struct ParagraphBudget {
    remaining: usize,
    in_paragraph: bool,
    done: bool,
}

impl ParagraphBudget {
    fn new(paragraphs: usize) -> ParagraphBudget {
        ParagraphBudget {
            remaining: paragraphs,
            in_paragraph: false,
            done: paragraphs == 0,
        }
    }

    /// Advances over one line and reports whether that line still belongs
    /// to the prefix. The boundary blank line itself does not.
    fn step(&mut self, line: &str) -> bool {
        if self.done {
            return false;
        }
        if line.trim().is_empty() {
            if self.in_paragraph {
                self.in_paragraph = false;
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.done = true;
                    return false;
                }
            }
        } else {
            self.in_paragraph = true;
        }
        true
    }
}

/// Returns the slice of `body` the summary is built from: everything
/// before [`MARKER`] when the marker is present, otherwise the first
/// `paragraphs` paragraphs. In the latter case a run of link-reference
/// lines (lines beginning with `[`) immediately after the cutoff is kept
/// with the prefix, so references used inside the summary still resolve
/// once the slice goes through markdown conversion.
pub fn extract(body: &str, paragraphs: usize) -> &str {
    if let Some(cut) = body.find(MARKER) {
        return &body[..cut];
    }

    let mut budget = ParagraphBudget::new(paragraphs);
    let mut end = 0; // end of the paragraph prefix
    let mut pos = 0; // scan position, past the boundary line once done
    if !budget.done {
        for line in body.split_inclusive('\n') {
            pos += line.len();
            if budget.step(line) {
                end = pos;
            }
            if budget.done {
                break;
            }
        }
        if !budget.done {
            // the body ran out before the budget did
            return body;
        }
    }

    let mut tail = end;
    let mut scan = pos;
    for line in body[pos..].split_inclusive('\n') {
        scan += line.len();
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with('[') {
            tail = scan;
        } else {
            break;
        }
    }
    &body[..tail]
}

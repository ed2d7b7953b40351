//! Separator-delimited iteration over a view.

use std::iter::FusedIterator;

use super::View;

/// Iterator returned by [`View::split`].
#[derive(Debug, Clone)]
pub struct Split<'a> {
    rest: Option<&'a [u8]>,
    separator: u8,
}

impl<'a> Split<'a> {
    pub(super) fn new(bytes: &'a [u8], separator: u8) -> Self {
        Self {
            rest: Some(bytes),
            separator,
        }
    }
}

impl<'a> Iterator for Split<'a> {
    type Item = View<'a>;

    fn next(&mut self) -> Option<View<'a>> {
        let rest = self.rest?;
        match rest.iter().position(|&b| b == self.separator) {
            Some(i) => {
                self.rest = Some(&rest[i + 1..]);
                Some(View::new(&rest[..i]))
            }
            None => {
                self.rest = None;
                // input ending exactly on a separator has no tail segment
                (!rest.is_empty()).then(|| View::new(rest))
            }
        }
    }
}

impl FusedIterator for Split<'_> {}

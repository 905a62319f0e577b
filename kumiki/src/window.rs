//! Bounds-checked view over decoder input.

use crate::error::{Error, Result};

/// A cursor over `base[offset..end]`.
///
/// Sub-windows produced by [`Window::skip`] borrow the same base slice, so
/// every offset a window reports is absolute within the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<'a> {
    base: &'a [u8],
    offset: usize,
    end: usize,
}

impl<'a> Window<'a> {
    pub fn new(base: &'a [u8]) -> Self {
        Window {
            base,
            offset: 0,
            end: base.len(),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Exclusive upper bound of this window.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.offset == self.end
    }

    pub fn remaining(&self) -> usize {
        self.end - self.offset
    }

    /// Checkpoint of the cursor for a later [`Window::restore`].
    pub fn save(&self) -> usize {
        self.offset
    }

    pub fn restore(&mut self, save: usize) {
        self.offset = save.min(self.end);
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        match self.rest().first() {
            Some(&b) => {
                self.offset += 1;
                Ok(b)
            }
            None => Err(self.overrun(1)),
        }
    }

    /// Carves the next `bytes` bytes off as a sub-window and advances past them.
    pub fn skip(&mut self, bytes: usize) -> Result<Window<'a>> {
        if bytes > self.remaining() {
            return Err(self.overrun(bytes));
        }
        let sub = Window {
            base: self.base,
            offset: self.offset,
            end: self.offset + bytes,
        };
        self.offset += bytes;
        Ok(sub)
    }

    /// Unread bytes up to the bound, without moving the cursor.
    pub fn rest(&self) -> &'a [u8] {
        self.base.get(self.offset..self.end).unwrap_or_default()
    }

    /// Bytes consumed since `save`.
    pub fn raw_from(&self, save: usize) -> &'a [u8] {
        self.base.get(save..self.offset).unwrap_or_default()
    }

    /// Consumes and returns every unread byte.
    pub fn read_all(&mut self) -> &'a [u8] {
        let rest = self.rest();
        self.offset = self.end;
        rest
    }

    fn overrun(&self, needed: usize) -> Error {
        Error::Overrun {
            offset: self.offset,
            needed,
            available: self.remaining(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Window;
    use crate::error::Error;

    #[test]
    fn test_read_u8_until_overrun() {
        let data = [0x01, 0x02];
        let mut w = Window::new(&data);
        assert_eq!(0x01, w.read_u8().unwrap());
        assert_eq!(0x02, w.read_u8().unwrap());
        assert!(w.is_empty());
        assert!(matches!(
            w.read_u8(),
            Err(Error::Overrun {
                offset: 2,
                needed: 1,
                available: 0
            })
        ));
    }

    #[rstest(
        len,
        expect_ok,
        case(0, true),
        case(3, true),
        case(4, true),
        case(5, false)
    )]
    fn test_skip_bounds(len: usize, expect_ok: bool) {
        let data = [0xaa, 0xbb, 0xcc, 0xdd];
        let mut w = Window::new(&data);
        assert_eq!(expect_ok, w.skip(len).is_ok());
    }

    #[test]
    fn test_skip_keeps_absolute_offsets() {
        let data = [0x30, 0x03, 0x02, 0x01, 0x05, 0xff];
        let mut w = Window::new(&data);
        w.read_u8().unwrap();
        w.read_u8().unwrap();
        let mut sub = w.skip(3).unwrap();
        assert_eq!(2, sub.offset());
        assert_eq!(5, sub.end());
        assert_eq!(5, w.offset());
        assert_eq!(&[0x02, 0x01, 0x05], sub.rest());
        // a sub-window can never read past its own bound
        assert!(sub.skip(4).is_err());
        assert_eq!(&[0x02, 0x01, 0x05], sub.read_all());
        assert!(sub.is_empty());
    }

    #[test]
    fn test_save_restore_and_raw() {
        let data = [0x01, 0x02, 0x03];
        let mut w = Window::new(&data);
        let save = w.save();
        w.read_u8().unwrap();
        w.read_u8().unwrap();
        assert_eq!(&[0x01, 0x02], w.raw_from(save));
        w.restore(save);
        assert_eq!(0, w.offset());
        assert_eq!(3, w.remaining());
    }
}

/// Helper function to get a fixed-size array at the start of an immutable slice
pub(crate) fn ref_array_start<const N: usize>(buf: &[u8]) -> Option<&[u8; N]> {
    let len = buf.len();
    (&buf[..N.min(len)]).try_into().ok()
}

/// Helper function to get a fixed-size array at the start of a mutable slice
pub(crate) fn mut_array_start<const N: usize>(buf: &mut [u8]) -> Option<&mut [u8; N]> {
    let len = buf.len();
    (&mut buf[..N.min(len)]).try_into().ok()
}

pub(crate) struct BytesReader<'a> {
    buf: &'a [u8],
    idx: usize,
}

impl<'a> BytesReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, idx: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.idx == self.buf.len()
    }

    pub fn next(&mut self) -> Option<u8> {
        if self.idx < self.buf.len() {
            let val = self.buf[self.idx];
            self.idx += 1;
            Some(val)
        } else {
            None
        }
    }

    pub fn next_n(&mut self, n: usize) -> &[u8] {
        let end_idx = (self.idx + n).min(self.buf.len());
        let data = &self.buf[self.idx..end_idx];
        self.idx = end_idx;
        data
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.idx..]
    }
}

/// Fixed-capacity byte buffer, used for the flight mode text payload.
#[derive(Clone)]
pub(crate) struct Buf<const C: usize> {
    buf: [u8; C],
    len: usize,
}

impl<const C: usize> Buf<C> {
    pub const fn new() -> Self {
        Self {
            buf: [0; C],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn push(&mut self, c: u8) -> bool {
        if let Some(v) = self.buf.get_mut(self.len) {
            *v = c;
            self.len += 1;
            true
        } else {
            false
        }
    }

    pub fn push_bytes(&mut self, data: &[u8]) {
        let n = data.len().min(C - self.len);
        self.buf[self.len..self.len + n].copy_from_slice(&data[..n]);
        self.len += n;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

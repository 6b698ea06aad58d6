/// Most items rendered at once.
pub const WINDOW_SIZE: usize = 3;

/// Cyclic position over a collection whose length is supplied per call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    position: usize,
}

impl Carousel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.position = (self.position + 1) % len;
    }

    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.position = (self.position % len + len - 1) % len;
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Indices of up to [`WINDOW_SIZE`] consecutive items, wrapping at the end.
    pub fn window_indices(&self, len: usize) -> Vec<usize> {
        if len == 0 {
            return Vec::new();
        }
        let start = self.position % len;
        (0..len.min(WINDOW_SIZE))
            .map(|offset| (start + offset) % len)
            .collect()
    }

    pub fn visible_window<'a, T>(&self, items: &'a [T]) -> Vec<&'a T> {
        self.window_indices(items.len())
            .into_iter()
            .map(|index| &items[index])
            .collect()
    }
}

use std::fmt;

/// Opaque token identifying a submitted job.
///
/// Used to express "run this after that". The default value, [`JobHandle::NONE`],
/// means "no dependency".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct JobHandle {
    pub(crate) index: u32,
    /// Generation 0 is never issued, so the zeroed handle is `NONE`.
    pub(crate) generation: u32,
}

impl JobHandle {
    pub const NONE: Self = Self { index: 0, generation: 0 };

    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn is_none(&self) -> bool {
        self.generation == 0
    }

    pub fn is_some(&self) -> bool {
        !self.is_none()
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "job#none")
        } else {
            write!(f, "job#{}v{}", self.index, self.generation)
        }
    }
}

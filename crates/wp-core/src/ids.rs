//! Integer handles for agents and grid cells.
//!
//! Both are plain `u32` newtypes.  The inner value is `pub`; `.index()` is
//! the spelling used when indexing per-agent or per-cell `Vec`s.

use std::fmt;

macro_rules! typed_id {
    ($(#[$attr:meta])* $name:ident, $label:literal) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " {}"), self.0)
            }
        }
    };
}

typed_id! {
    /// Index of an agent (robot) in an executor run.
    AgentId, "agent"
}

typed_id! {
    /// Row-major linear index of a grid cell: `y * width + x`.
    CellId, "cell"
}

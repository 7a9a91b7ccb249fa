use num_enum::FromPrimitive;

#[doc = r#"
The `format` word of a MIDI header.

Format 0 holds one multi-channel track. Format 1 holds tracks meant to play together,
where track 0 is usually the conductor. Format 2 holds independent sequences; it is
indexed like format 1 without further checks.

```rust
# use scorestream::file::FormatType;
assert_eq!(FormatType::from(1), FormatType::Simultaneous);
assert_eq!(FormatType::from(9), FormatType::Other(9));
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum FormatType {
    /// Format 0
    SingleMultiChannel = 0,
    /// Format 1
    Simultaneous = 1,
    /// Format 2
    SequentiallyIndependent = 2,
    /// Anything else, kept as read
    #[num_enum(catch_all)]
    Other(u16),
}

impl FormatType {
    /// The raw format word
    pub const fn word(&self) -> u16 {
        match self {
            Self::SingleMultiChannel => 0,
            Self::Simultaneous => 1,
            Self::SequentiallyIndependent => 2,
            Self::Other(word) => *word,
        }
    }
}

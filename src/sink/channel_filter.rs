use super::{Filter, ParamId};
use crate::message::{Message, channel::Channel};

#[doc = r#"
Lets through only the channels whose bit is set in a 16-bit mask.

Messages that carry no channel always pass.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelFilter {
    mask: u16,
}

impl Default for ChannelFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelFilter {
    /// All channels enabled
    pub const fn new() -> Self {
        Self { mask: 0xFFFF }
    }

    /// Only the channels set in `mask`
    pub const fn with_mask(mask: u16) -> Self {
        Self { mask }
    }

    /// True if `channel` passes
    pub fn is_enabled(&self, channel: Channel) -> bool {
        self.mask & channel.mask_bit() != 0
    }
}

impl Filter for ChannelFilter {
    fn is_available(&self, param: ParamId) -> bool {
        matches!(
            param,
            ParamId::EnableChannel | ParamId::DisableChannel | ParamId::ChannelMask
        )
    }

    fn get_param(&self, param: ParamId) -> Option<i64> {
        (param == ParamId::ChannelMask).then_some(self.mask as i64)
    }

    fn set_param(&mut self, param: ParamId, value: i64) -> bool {
        match param {
            ParamId::EnableChannel | ParamId::DisableChannel => {
                let Some(channel) = u8::try_from(value).ok().filter(|&c| c < 16) else {
                    return false;
                };
                let bit = Channel::from(channel).mask_bit();
                if param == ParamId::EnableChannel {
                    self.mask |= bit;
                } else {
                    self.mask &= !bit;
                }
                true
            }
            ParamId::ChannelMask => match u16::try_from(value) {
                Ok(mask) => {
                    self.mask = mask;
                    true
                }
                Err(_) => false,
            },
            _ => false,
        }
    }

    fn send(&mut self, message: Message) -> Option<Message> {
        match message.channel() {
            Some(channel) if !self.is_enabled(channel) => None,
            _ => Some(message),
        }
    }
}

#[test]
fn mask_params() {
    let mut filter = ChannelFilter::new();
    assert!(filter.set_param(ParamId::ChannelMask, 0b0101));
    assert!(filter.is_enabled(Channel::One));
    assert!(!filter.is_enabled(Channel::Two));
    assert!(filter.set_param(ParamId::EnableChannel, 1));
    assert!(filter.set_param(ParamId::DisableChannel, 2));
    assert_eq!(filter.get_param(ParamId::ChannelMask), Some(0b0011));
    assert!(!filter.set_param(ParamId::EnableChannel, 16));
    assert!(!filter.set_param(ParamId::ChannelMask, 0x1_0000));
}

#[test]
fn channelless_messages_pass() {
    let mut filter = ChannelFilter::with_mask(0);
    assert_eq!(
        filter.send(Message::SongSelect(3)),
        Some(Message::SongSelect(3))
    );
    assert_eq!(
        filter.send(Message::ProgramChange {
            program: 1,
            channel: Channel::Ten
        }),
        None
    );
}

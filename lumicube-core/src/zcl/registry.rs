//! Attribute getters and setters
//!
//! Both are called in the size-only and the apply pass. Validation runs in
//! both so the two passes report the same statuses; state only changes in
//! the apply pass.

use lumicube_hal::{ConfigStorage, PowerControl, RealTimeClock};
use lumicube_protocol::{ExecMode, Status};

use super::attributes::{Attribute, AttributeDef, ZIGBEE_TIME_OFFSET};
use super::value::AttributeValue;
use crate::device::DeviceContext;
use crate::state::Mode;

impl<'a, S, C, P> DeviceContext<'a, S, C, P>
where
    S: ConfigStorage,
    C: RealTimeClock,
    P: PowerControl,
{
    /// Current value of an attribute
    ///
    /// The stored playlist and effect only come from storage in the apply
    /// pass. Both are fixed width, so the size-only pass reports the active
    /// selection instead.
    pub fn read_attribute(
        &mut self,
        def: &AttributeDef,
        mode: ExecMode,
    ) -> Result<AttributeValue<'_>, Status> {
        if !def.access.readable() {
            return Err(Status::WriteOnly);
        }

        Ok(match def.attribute {
            Attribute::DeviceEnabled => AttributeValue::Boolean(self.state.mode.is_rendering()),
            Attribute::AlarmMask => AttributeValue::Boolean(self.alarm_mask),
            Attribute::OperatingMode => AttributeValue::Enum8(self.state.mode.as_u8()),
            Attribute::Playlist if mode.is_apply() => AttributeValue::Uint8(self.stored_playlist()),
            Attribute::Playlist => AttributeValue::Uint8(self.state.playlist),
            Attribute::Effect if mode.is_apply() => AttributeValue::Uint8(self.stored_effect()),
            Attribute::Effect => AttributeValue::Uint8(self.state.effect),
            Attribute::Timezone => AttributeValue::Int32(self.clock.timezone()),
            Attribute::Time => {
                AttributeValue::UtcTime(self.clock.now().wrapping_sub(ZIGBEE_TIME_OFFSET))
            }
            Attribute::EffectNames => AttributeValue::NameList(&self.effects),
            Attribute::PlaylistNames => AttributeValue::LongOctetString(self.playlists.names_json()),
            Attribute::PlaylistEffects => {
                AttributeValue::EffectIds(self.playlists.entries(self.state.playlist))
            }
            Attribute::HwVersion => AttributeValue::OctetString(self.config.hw_version.as_bytes()),
            Attribute::SwVersion => AttributeValue::OctetString(self.config.sw_version.as_bytes()),
            Attribute::DeviceAddress => AttributeValue::IeeeAddress(self.address),
            Attribute::PlaylistPosition => {
                AttributeValue::Uint8(self.selector.position(&self.playlists, self.state.playlist))
            }
            Attribute::EffectText => return Err(Status::WriteOnly),
        })
    }

    /// Validate a written value and, in the apply pass, store it
    ///
    /// The value has already been decoded with the attribute's own type.
    pub fn write_attribute(
        &mut self,
        def: &AttributeDef,
        value: AttributeValue<'_>,
        mode: ExecMode,
    ) -> Result<(), Status> {
        if !def.access.writable() {
            return Err(Status::ReadOnly);
        }
        let apply = mode.is_apply();

        match (def.attribute, value) {
            (Attribute::DeviceEnabled, AttributeValue::Boolean(enabled)) => {
                if apply {
                    self.set_mode(if enabled { Mode::Playlist } else { Mode::Idle });
                }
            }
            (Attribute::AlarmMask, AttributeValue::Boolean(mask)) => {
                if apply {
                    self.alarm_mask = mask;
                }
            }
            (Attribute::OperatingMode, AttributeValue::Enum8(raw)) => {
                let next = Mode::from_u8(raw).ok_or(Status::InvalidValue)?;
                if apply {
                    self.set_mode(next);
                }
            }
            (Attribute::EffectText, AttributeValue::OctetString(text)) => {
                if apply {
                    self.store_text(text);
                }
            }
            (Attribute::Playlist, AttributeValue::Uint8(playlist)) => {
                if playlist as usize >= self.playlists.len() {
                    return Err(Status::InvalidValue);
                }
                if apply {
                    self.store_playlist(playlist);
                }
            }
            (Attribute::Effect, AttributeValue::Uint8(effect)) => {
                if effect as usize >= self.effects.len() {
                    return Err(Status::InvalidValue);
                }
                if apply {
                    self.store_effect(effect);
                }
            }
            (Attribute::Timezone, AttributeValue::Int32(offset)) => {
                if apply {
                    self.clock.set_timezone(offset);
                }
            }
            (Attribute::Time, AttributeValue::UtcTime(zigbee_s)) => {
                if apply {
                    self.clock.set_time(zigbee_s.wrapping_add(ZIGBEE_TIME_OFFSET));
                }
            }
            (Attribute::DeviceAddress, AttributeValue::IeeeAddress(address)) => {
                if apply {
                    self.store_address(address);
                }
            }
            _ => return Err(Status::InvalidDataType),
        }
        Ok(())
    }
}

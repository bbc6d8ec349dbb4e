//! Command dispatcher
//!
//! Filters a received packet, routes it to the read, write or report
//! handler, and streams the response. Read and write handlers run twice:
//! a size-only pass to learn the response length, then an apply pass that
//! emits bytes and changes state.

use lumicube_hal::{ConfigStorage, PowerControl, RealTimeClock};
use lumicube_protocol::{
    ByteSink, CommandId, DataType, ExecMode, MessageCursor, Packet, ResponseWriter, Status,
    ZCL_CHANNEL,
};

use super::attributes::{
    is_served_cluster, lookup, ATTR_TIME_AND_ZONE, CLUSTER_TIME, ZIGBEE_TIME_OFFSET,
};
use super::value::AttributeValue;
use crate::device::DeviceContext;

/// Length of the time-and-zone octet string
const TIME_AND_ZONE_LEN: u8 = 8;

/// What happened to a dispatched packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchOutcome {
    /// Filtered out, nothing sent
    Ignored,
    /// Notification applied, nothing sent
    Applied,
    /// Response sent with this payload length
    Responded(usize),
}

/// Response-producing command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Read,
    Write,
    Default { command: u8, status: Status },
}

impl<'a, S, C, P> DeviceContext<'a, S, C, P>
where
    S: ConfigStorage,
    C: RealTimeClock,
    P: PowerControl,
{
    /// Handle a validated frame payload
    ///
    /// The frame has already been acknowledged. Any response is written to
    /// `sink` as a complete frame.
    pub fn dispatch<W: ByteSink>(&mut self, payload: &[u8], sink: &mut W) -> DispatchOutcome {
        let packet = match Packet::parse(payload) {
            Ok(packet) => packet,
            Err(e) => {
                debug!("Dropping packet: {:?}", e);
                return DispatchOutcome::Ignored;
            }
        };
        let header = &packet.header;

        if header.channel != ZCL_CHANNEL
            || (header.address != self.address && header.address != 0)
            || header.manufacturer_specific()
        {
            trace!("Packet not for this device");
            return DispatchOutcome::Ignored;
        }
        if header.profile != self.config.profile {
            debug!("Unsupported profile {}", header.profile);
            return DispatchOutcome::Ignored;
        }

        let command = CommandId::from_u8(header.command);
        if command == Some(CommandId::DefaultResponse) {
            return DispatchOutcome::Ignored;
        }

        if command == Some(CommandId::ReportAttributes)
            && header.cluster == CLUSTER_TIME
            && header.endpoint == self.config.config_endpoint
        {
            self.process_time_report(packet.cursor());
            return DispatchOutcome::Applied;
        }

        let reply = match command {
            Some(CommandId::ReadAttributes | CommandId::WriteAttributes)
                if header.endpoint == self.config.endpoint =>
            {
                if !is_served_cluster(header.cluster) {
                    Reply::Default {
                        command: header.command,
                        status: Status::UnsupportedClusterCommand,
                    }
                } else if command == Some(CommandId::ReadAttributes) {
                    Reply::Read
                } else {
                    Reply::Write
                }
            }
            _ => Reply::Default {
                command: header.command,
                status: Status::UnsupportedGeneralCommand,
            },
        };

        if matches!(reply, Reply::Default { .. }) && header.disable_default_response() {
            return DispatchOutcome::Ignored;
        }

        let length = self.respond(&packet, reply, sink);
        debug!("Dispatched command {}, {} byte response", header.command, length);
        DispatchOutcome::Responded(length)
    }

    /// Run the two passes and return the payload length
    ///
    /// A response too long for the frame length field is replaced by a
    /// failure default response before anything is applied.
    fn respond<W: ByteSink>(&mut self, packet: &Packet<'_>, reply: Reply, sink: &mut W) -> usize {
        let variant = self.config.crc_variant;

        let mut sizing = ResponseWriter::new(ExecMode::SizeOnly, variant, sink);
        self.run_reply(packet, reply, &mut sizing);
        let size = sizing.finish();

        let Ok(length) = u16::try_from(size) else {
            warn!("Response of {} bytes does not fit a frame", size);
            let failure = Reply::Default {
                command: packet.header.command,
                status: Status::Failure,
            };
            return self.respond(packet, failure, sink);
        };

        let mut writer = ResponseWriter::new(ExecMode::Apply, variant, sink);
        writer.begin(length);
        self.run_reply(packet, reply, &mut writer);
        let emitted = writer.finish();

        debug_assert_eq!(size, emitted, "size-only and apply passes diverged");
        emitted
    }

    fn run_reply<W: ByteSink>(
        &mut self,
        packet: &Packet<'_>,
        reply: Reply,
        writer: &mut ResponseWriter<'_, W>,
    ) {
        match reply {
            Reply::Read => self.process_read(packet, writer),
            Reply::Write => self.process_write(packet, writer),
            Reply::Default { command, status } => {
                let header = packet
                    .header
                    .response(self.address, CommandId::DefaultResponse.as_u8());
                writer.put_header(&header);
                writer.put_u8(command);
                writer.put_u8(status.as_u8());
            }
        }
    }

    fn process_read<W: ByteSink>(&mut self, packet: &Packet<'_>, writer: &mut ResponseWriter<'_, W>) {
        let header = packet
            .header
            .response(self.address, CommandId::ReadAttributesResponse.as_u8());
        writer.put_header(&header);

        let mode = writer.mode();
        let mut cursor = packet.cursor();
        while let Ok(id) = cursor.read_u16() {
            writer.put_u16(id);
            let Some(def) = lookup(packet.header.cluster, id) else {
                writer.put_u8(Status::UnsupportedAttribute.as_u8());
                continue;
            };
            match self.read_attribute(def, mode) {
                Ok(value) => {
                    writer.put_u8(Status::Success.as_u8());
                    writer.put_u8(value.data_type().as_u8());
                    value.encode(writer);
                }
                Err(status) => writer.put_u8(status.as_u8()),
            }
        }
    }

    fn process_write<W: ByteSink>(&mut self, packet: &Packet<'_>, writer: &mut ResponseWriter<'_, W>) {
        let mode = writer.mode();
        let header = packet
            .header
            .response(self.address, CommandId::WriteAttributesResponse.as_u8());
        writer.put_header(&header);

        let mut success = true;
        let mut cursor = packet.cursor();
        while cursor.has_remaining() {
            let (Ok(id), Ok(tag)) = (cursor.read_u16(), cursor.read_u8()) else {
                warn!("Truncated write record");
                success = false;
                break;
            };

            let Some(data_type) = DataType::from_u8(tag) else {
                // Width unknown, the rest of the payload cannot be parsed
                write_status(writer, id, Status::InvalidDataType);
                success = false;
                break;
            };

            let status = match lookup(packet.header.cluster, id) {
                Some(def) if def.access.writable() && def.data_type == data_type => {
                    let Ok(value) = AttributeValue::decode(data_type, &mut cursor) else {
                        warn!("Truncated value for attribute {}", id);
                        success = false;
                        break;
                    };
                    self.write_attribute(def, value, mode).err()
                }
                rejected => {
                    let status = match rejected {
                        None => Status::UnsupportedAttribute,
                        Some(def) if !def.access.writable() => Status::ReadOnly,
                        Some(_) => Status::InvalidDataType,
                    };
                    if data_type.skip(&mut cursor).is_err() {
                        write_status(writer, id, status);
                        success = false;
                        break;
                    }
                    Some(status)
                }
            };

            if let Some(status) = status {
                success = false;
                write_status(writer, id, status);
            }
        }

        if success {
            writer.put_u8(Status::Success.as_u8());
        }
    }

    /// Apply a time report
    ///
    /// Reports are notifications: they take effect at once and are never
    /// answered. Parsing stops at the first unexpected record.
    fn process_time_report(&mut self, mut cursor: MessageCursor<'_>) {
        while cursor.has_remaining() {
            let Ok(ATTR_TIME_AND_ZONE) = cursor.read_u16() else {
                return;
            };
            if cursor.read_u8() != Ok(DataType::OctetString.as_u8())
                || cursor.read_u8() != Ok(TIME_AND_ZONE_LEN)
            {
                return;
            }
            let (Ok(zigbee_s), Ok(zone)) = (cursor.read_u32(), cursor.read_i32()) else {
                return;
            };
            self.clock.set_time(zigbee_s.wrapping_add(ZIGBEE_TIME_OFFSET));
            self.clock.set_timezone(zone);
            info!("Clock set from time report");
        }
    }
}

fn write_status<W: ByteSink>(writer: &mut ResponseWriter<'_, W>, id: u16, status: Status) {
    writer.put_u16(id);
    writer.put_u8(status.as_u8());
}

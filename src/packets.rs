use std::{

    fmt::{

        Result as FmtResult,
        Formatter,
        Debug,
    },

    net::{Ipv4Addr},
    io::{Cursor},
};

use byteorder::{

    ReadBytesExt,
    ByteOrder,
    BigEndian,
};

use super::{

    checksum::{checksum},
    error::{ProbeError},
};

pub const ICMP_ECHO_REQUEST: u8 = 8;
pub const ICMP_ECHO_REPLY: u8 = 0;

/// Every request carries sequence number one, correlation is by identifier.
pub const ECHO_SEQUENCE: u16 = 1;

pub const IPV4_HEADER_SIZE: usize = 20;
pub const ICMP_HEADER_SIZE: usize = 8;
pub const PAYLOAD_SIZE: usize = 192;
pub const PAYLOAD_FILLER: u8 = b'Q';

pub const PACKET_SIZE: usize = ICMP_HEADER_SIZE + PAYLOAD_SIZE;

/// Shortest datagram the decoder accepts, IPv4 header followed by an ICMP header.
pub const REPLY_MIN_SIZE: usize = IPV4_HEADER_SIZE + ICMP_HEADER_SIZE;

// ICMP header offsets, relative to the start of the ICMP message.
const ICMP_TYPE_OFFSET: usize = 0;
const ICMP_CODE_OFFSET: usize = 1;
const ICMP_CHECKSUM_OFFSET: usize = 2;
const ICMP_IDENTIFIER_OFFSET: usize = 4;
const ICMP_SEQUENCE_OFFSET: usize = 6;

/// An ICMPv4 echo request, header and filler payload, ready to be sent.
#[derive(Clone)]
pub struct EchoRequest {
    buffer: [u8; PACKET_SIZE],
}

impl EchoRequest {

    /// Build a request carrying `identifier` with the checksum already embedded.
    pub fn new(identifier: u16) -> EchoRequest {
        let mut buffer = [PAYLOAD_FILLER; PACKET_SIZE];

        buffer[ICMP_TYPE_OFFSET] = ICMP_ECHO_REQUEST;
        buffer[ICMP_CODE_OFFSET] = 0;

        BigEndian::write_u16(&mut buffer[ICMP_CHECKSUM_OFFSET..], 0);
        BigEndian::write_u16(&mut buffer[ICMP_IDENTIFIER_OFFSET..], identifier);
        BigEndian::write_u16(&mut buffer[ICMP_SEQUENCE_OFFSET..], ECHO_SEQUENCE);

        let sum = checksum(&(buffer[..]));
        BigEndian::write_u16(&mut buffer[ICMP_CHECKSUM_OFFSET..], sum);

        EchoRequest {
            buffer: buffer,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &(self.buffer[..])
    }

    pub fn payload(&self) -> &[u8] {
        &(self.buffer[ICMP_HEADER_SIZE..])
    }

    pub fn get_type(&self) -> u8 {
        self.buffer[ICMP_TYPE_OFFSET]
    }

    pub fn get_code(&self) -> u8 {
        self.buffer[ICMP_CODE_OFFSET]
    }

    pub fn get_checksum(&self) -> u16 {
        BigEndian::read_u16(&(self.buffer[ICMP_CHECKSUM_OFFSET..]))
    }

    pub fn get_identifier(&self) -> u16 {
        BigEndian::read_u16(&(self.buffer[ICMP_IDENTIFIER_OFFSET..]))
    }

    pub fn get_sequence(&self) -> u16 {
        BigEndian::read_u16(&(self.buffer[ICMP_SEQUENCE_OFFSET..]))
    }
}

impl Debug for EchoRequest {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.debug_struct("EchoRequest")
            .field("identifier", &(self.get_identifier()))
            .field("sequence", &(self.get_sequence()))
            .field("checksum", &(self.get_checksum()))
            .field("type", &(self.get_type()))
            .field("code", &(self.get_code()))
            .finish()
    }
}

/// Fixed part of an IPv4 header, bytes 0 through 19 of a received datagram.
///
/// | offset | field                          |
/// |--------|--------------------------------|
/// | 0      | version (high nibble), IHL     |
/// | 1      | type of service                |
/// | 2..4   | total length                   |
/// | 4..6   | identification                 |
/// | 6..8   | flags (3 bits), fragment offset|
/// | 8      | time to live                   |
/// | 9      | protocol                       |
/// | 10..12 | header checksum                |
/// | 12..16 | source address                 |
/// | 16..20 | destination address            |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ipv4Header {
    pub version: u8,
    /// Header length in octets.
    pub header_length: u8,
    pub type_of_service: u8,
    pub total_length: u16,
    pub identification: u16,
    pub flags: u8,
    pub fragment_offset: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: u16,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

impl Ipv4Header {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Ipv4Header, ProbeError> {
        let version_ihl = cursor.read_u8().map_err(|e| {
            ProbeError::ResponseReadField("version", e.to_string())
        })?;

        let type_of_service = cursor.read_u8().map_err(|e| {
            ProbeError::ResponseReadField("type of service", e.to_string())
        })?;

        let total_length = cursor.read_u16::<BigEndian>().map_err(|e| {
            ProbeError::ResponseReadField("total length", e.to_string())
        })?;

        let identification = cursor.read_u16::<BigEndian>().map_err(|e| {
            ProbeError::ResponseReadField("identification", e.to_string())
        })?;

        let flags_fragment = cursor.read_u16::<BigEndian>().map_err(|e| {
            ProbeError::ResponseReadField("flags", e.to_string())
        })?;

        let ttl = cursor.read_u8().map_err(|e| {
            ProbeError::ResponseReadField("time to live", e.to_string())
        })?;

        let protocol = cursor.read_u8().map_err(|e| {
            ProbeError::ResponseReadField("protocol", e.to_string())
        })?;

        let checksum = cursor.read_u16::<BigEndian>().map_err(|e| {
            ProbeError::ResponseReadField("header checksum", e.to_string())
        })?;

        let source = cursor.read_u32::<BigEndian>().map_err(|e| {
            ProbeError::ResponseReadField("source address", e.to_string())
        })?;

        let destination = cursor.read_u32::<BigEndian>().map_err(|e| {
            ProbeError::ResponseReadField("destination address", e.to_string())
        })?;

        Ok(Ipv4Header {

            version: version_ihl >> 4,
            header_length: (version_ihl & 0x0F) * 4,
            type_of_service: type_of_service,
            total_length: total_length,
            identification: identification,
            flags: (flags_fragment >> 13) as u8,
            fragment_offset: flags_fragment & 0x1FFF,
            ttl: ttl,
            protocol: protocol,
            checksum: checksum,
            source: Ipv4Addr::from(source),
            destination: Ipv4Addr::from(destination),
        })
    }
}

/// ICMP header, bytes 20 through 27 of a received datagram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IcmpHeader {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence: u16,
}

impl IcmpHeader {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<IcmpHeader, ProbeError> {
        let icmp_type = cursor.read_u8().map_err(|e| {
            ProbeError::ResponseReadField("type", e.to_string())
        })?;

        let code = cursor.read_u8().map_err(|e| {
            ProbeError::ResponseReadField("code", e.to_string())
        })?;

        let checksum = cursor.read_u16::<BigEndian>().map_err(|e| {
            ProbeError::ResponseReadField("checksum", e.to_string())
        })?;

        let identifier = cursor.read_u16::<BigEndian>().map_err(|e| {
            ProbeError::ResponseReadField("identifier", e.to_string())
        })?;

        let sequence = cursor.read_u16::<BigEndian>().map_err(|e| {
            ProbeError::ResponseReadField("sequence number", e.to_string())
        })?;

        Ok(IcmpHeader {
            icmp_type,
            code,
            checksum,
            identifier,
            sequence,
        })
    }

    pub fn is_echo_reply(&self) -> bool {
        self.icmp_type == ICMP_ECHO_REPLY && self.code == 0
    }
}

/// Decode the IPv4 and ICMP headers at the front of a received datagram.
pub fn decode(datagram: &[u8]) -> Result<(Ipv4Header, IcmpHeader), ProbeError> {
    if datagram.len() < REPLY_MIN_SIZE {
        return Err(ProbeError::MalformedPacket {
            expected: REPLY_MIN_SIZE,
            actual: datagram.len(),
        })
    }

    let mut cursor = Cursor::new(datagram);

    let ip = Ipv4Header::read(&mut cursor)?;
    let icmp = IcmpHeader::read(&mut cursor)?;

    Ok((ip, icmp))
}

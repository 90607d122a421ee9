/// Internet checksum (RFC 1071) of `data`, returned in network byte order.
///
/// Words are summed little-endian with an odd trailing octet added on its own,
/// carries are folded back into the low half, and the complement is swapped
/// into network order. Writing the result big-endian into a packet makes the
/// checksum of the whole packet zero.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum: u64 = data.chunks(2).map(|chunk| match chunk {

        &[a, b] => u16::from_le_bytes([a, b]) as u64,
        &[a] => a as u64,
        &[..] => 0 as u64,

    }).sum();

    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }

    (!(sum as u16)).swap_bytes()
}

//! CRC32 (IEEE 802.3) and Adler32, as required by PNG chunks and zlib streams.

use std::sync::OnceLock;

const CRC32_POLYNOMIAL: u32 = 0xEDB8_8320;
const ADLER32_MODULUS: u32 = 65521;

static CRC32_TABLE: OnceLock<[u32; 256]> = OnceLock::new();

fn crc32_table() -> &'static [u32; 256] {
    CRC32_TABLE.get_or_init(|| {
        let mut table = [0u32; 256];
        for (n, entry) in (0u32..).zip(table.iter_mut()) {
            let mut crc = n;
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ CRC32_POLYNOMIAL
                } else {
                    crc >> 1
                };
            }
            *entry = crc;
        }
        table
    })
}

/// Incremental CRC32, for checksumming a chunk type and its payload without
/// first copying them into one buffer
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Self { state: 0xFFFF_FFFF }
    }

    pub fn update(mut self, data: &[u8]) -> Self {
        let table = crc32_table();
        for &byte in data {
            self.state = (self.state >> 8) ^ table[usize::from((self.state as u8) ^ byte)];
        }
        self
    }

    pub fn finalize(self) -> u32 {
        self.state ^ 0xFFFF_FFFF
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot CRC32 of `data`
pub fn crc32(data: &[u8]) -> u32 {
    Crc32::new().update(data).finalize()
}

/// Adler32 of `data`, `(b << 16) | a`
pub fn adler32(data: &[u8]) -> u32 {
    let (a, b) = data.iter().fold((1u32, 0u32), |(a, b), &byte| {
        let a = (a + u32::from(byte)) % ADLER32_MODULUS;
        (a, (b + a) % ADLER32_MODULUS)
    });
    (b << 16) | a
}

//! Mock collaborators and fixtures for unit tests

use core::cell::Cell;

use heapless::{Deque, Vec};
use lumicube_hal::{
    ConfigStorage, PowerControl, RealTimeClock, StorageError, StorageKey, TickSource, UartRx,
    UartTx,
};
use lumicube_protocol::{hex, CrcVariant, PacketHeader, ZCL_CHANNEL};

use crate::config::{DeviceConfig, DEFAULT_ENDPOINT, DEFAULT_PROFILE, FACTORY_ADDRESS};
use crate::device::DeviceContext;
use crate::effect::{Effect, EffectContext, EffectDescriptor, EffectEntry, EffectRegistry};
use crate::framebuffer::FlipPolicy;
use crate::playlist::{PlaylistCatalog, PlaylistEntry};
use crate::scheduler::RenderScheduler;

const SLOT_CAPACITY: usize = 32;
const SLOTS: usize = 5;

/// In-memory configuration store
#[derive(Default)]
pub struct MockStorage {
    slots: [Option<Vec<u8, SLOT_CAPACITY>>; SLOTS],
    pub reads: u32,
    pub writes: u32,
    pub fail_writes: bool,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStorage for MockStorage {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        self.reads += 1;
        let data = self.slots[key.as_u8() as usize]
            .as_ref()
            .ok_or(StorageError::NotFound)?;
        if buffer.len() < data.len() {
            return Err(StorageError::BufferTooSmall);
        }
        buffer[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Storage);
        }
        self.writes += 1;
        let stored = Vec::from_slice(data).map_err(|_| StorageError::Full)?;
        self.slots[key.as_u8() as usize] = Some(stored);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockClock {
    pub now: u32,
    pub timezone: i32,
}

impl RealTimeClock for MockClock {
    fn now(&self) -> u32 {
        self.now
    }

    fn set_time(&mut self, unix_s: u32) {
        self.now = unix_s;
    }

    fn timezone(&self) -> i32 {
        self.timezone
    }

    fn set_timezone(&mut self, offset_s: i32) {
        self.timezone = offset_s;
    }
}

/// Counts power hook calls
#[derive(Default)]
pub struct MockPower {
    pub starts: u32,
    pub shutdowns: u32,
    pub waits: u32,
}

impl PowerControl for MockPower {
    fn start(&mut self) {
        self.starts += 1;
    }

    fn shutdown(&mut self) {
        self.shutdowns += 1;
    }

    fn wait_for_interrupt(&mut self) {
        self.waits += 1;
    }
}

/// Loopback serial port
#[derive(Default)]
pub struct MockSerial {
    pub rx: Deque<u8, 512>,
    pub tx: Vec<u8, 4096>,
}

impl MockSerial {
    /// Queue bytes as if the host sent them
    pub fn feed(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.rx.push_back(b).unwrap();
        }
    }

    /// Take everything sent so far
    pub fn take_tx(&mut self) -> Vec<u8, 4096> {
        core::mem::take(&mut self.tx)
    }
}

impl UartTx for MockSerial {
    type Error = ();

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
        self.tx.extend_from_slice(data)
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}

impl UartRx for MockSerial {
    type Error = ();

    fn try_read_byte(&mut self) -> Result<Option<u8>, ()> {
        Ok(self.rx.pop_front())
    }

    fn has_pending(&self) -> bool {
        !self.rx.is_empty()
    }
}

/// Manually advanced tick counter
#[derive(Default)]
pub struct MockTicks {
    pub value: u16,
    pub resets: u32,
}

impl TickSource for MockTicks {
    fn ticks(&self) -> u16 {
        self.value
    }

    fn reset(&mut self) {
        self.value = 0;
        self.resets += 1;
    }
}

/// Call counts per effect id
#[derive(Default)]
pub struct EffectCounters {
    pub inits: [Cell<u32>; 5],
    pub draws: [Cell<u32>; 5],
    pub last_data: Cell<Option<&'static [u8]>>,
    pub last_text_len: Cell<usize>,
}

impl EffectCounters {
    pub fn inits(&self, id: u8) -> u32 {
        self.inits[id as usize].get()
    }

    pub fn draws(&self, id: u8) -> u32 {
        self.draws[id as usize].get()
    }
}

/// Effect that records its calls
///
/// Init paints voxel (0, 0, 0) with `id + 1`. Each draw paints voxel
/// (1, 0, 0) with the draw count.
pub struct CountingEffect<'c> {
    id: usize,
    counters: &'c EffectCounters,
    animated: bool,
}

impl<'c> CountingEffect<'c> {
    pub fn new(id: usize, counters: &'c EffectCounters) -> Self {
        Self {
            id,
            counters,
            animated: true,
        }
    }

    /// Effect without a draw step
    pub fn still(id: usize, counters: &'c EffectCounters) -> Self {
        Self {
            animated: false,
            ..Self::new(id, counters)
        }
    }
}

impl Effect for CountingEffect<'_> {
    fn animated(&self) -> bool {
        self.animated
    }

    fn init(&mut self, cx: &mut EffectContext<'_>) {
        let count = &self.counters.inits[self.id];
        count.set(count.get() + 1);
        cx.frame.set(0, 0, 0, self.id as u16 + 1).unwrap();
    }

    fn draw(&mut self, cx: &mut EffectContext<'_>) {
        let count = &self.counters.draws[self.id];
        count.set(count.get() + 1);
        cx.frame.set(1, 0, 0, (count.get() & 0xFFF) as u16).unwrap();
        self.counters.last_data.set(cx.custom_data);
        self.counters.last_text_len.set(cx.text.len());
    }
}

pub const STATIC_EFFECT: u8 = 2;
pub const TEXT_EFFECT: u8 = 4;

pub static DESCRIPTORS: [EffectDescriptor; 5] = [
    EffectDescriptor::new("sine", FlipPolicy::Flip, 2),
    EffectDescriptor::new("heart", FlipPolicy::Flip, 3),
    EffectDescriptor::new("stairs", FlipPolicy::NoFlip, 100),
    EffectDescriptor::new("worm", FlipPolicy::Flip, 1),
    EffectDescriptor::new("scroll_text", FlipPolicy::NoFlip, 1).with_dynamic_text(),
];

pub static PLAYLIST_DATA: [u8; 1] = [0x2A];

/// Playlist 0 is entries 0..3, playlist 1 is entries 3..5
pub static MASTER: [PlaylistEntry; 5] = [
    PlaylistEntry::new(0, 10),
    PlaylistEntry::new(1, 20).with_data(&PLAYLIST_DATA),
    PlaylistEntry::new(STATIC_EFFECT, 30),
    PlaylistEntry::new(3, 5),
    PlaylistEntry::new(TEXT_EFFECT, 6),
];

pub static STARTS: [u8; 2] = [0, 3];

pub const PLAYLIST_NAMES: &[u8] = b"[\"demo\",\"night\"]";

pub type TestDevice<'a> = DeviceContext<'a, MockStorage, MockClock, MockPower>;
pub type TestScheduler<'a> =
    RenderScheduler<'a, MockStorage, MockClock, MockPower, MockSerial, MockTicks>;

fn effects(counters: &EffectCounters) -> [CountingEffect<'_>; 5] {
    [
        CountingEffect::new(0, counters),
        CountingEffect::new(1, counters),
        CountingEffect::still(2, counters),
        CountingEffect::new(3, counters),
        CountingEffect::new(4, counters),
    ]
}

/// Run `f` against a device built from the fixture tables
pub fn with_device<R>(storage: MockStorage, f: impl FnOnce(&mut TestDevice<'_>) -> R) -> R {
    with_device_and_counters(storage, |device, _| f(device))
}

pub fn with_device_and_counters<R>(
    storage: MockStorage,
    f: impl FnOnce(&mut TestDevice<'_>, &EffectCounters) -> R,
) -> R {
    with_playlist_names(storage, PLAYLIST_NAMES, f)
}

/// Like [`with_device_and_counters`] with a different playlist name list
pub fn with_playlist_names<R>(
    storage: MockStorage,
    names_json: &'static [u8],
    f: impl FnOnce(&mut TestDevice<'_>, &EffectCounters) -> R,
) -> R {
    let counters = EffectCounters::default();
    let mut effects = effects(&counters);
    let [a, b, c, d, e] = &mut effects;
    let mut entries = [
        EffectEntry::new(DESCRIPTORS[0], a),
        EffectEntry::new(DESCRIPTORS[1], b),
        EffectEntry::new(DESCRIPTORS[2], c),
        EffectEntry::new(DESCRIPTORS[3], d),
        EffectEntry::new(DESCRIPTORS[4], e),
    ];
    let catalog = PlaylistCatalog::new(&MASTER, &STARTS, names_json).unwrap();
    let mut device = DeviceContext::new(
        DeviceConfig::default(),
        EffectRegistry::new(&mut entries),
        catalog,
        storage,
        MockClock::default(),
        MockPower::default(),
    )
    .unwrap();
    f(&mut device, &counters)
}

/// Run `f` against a booted scheduler built from the fixture tables
pub fn with_scheduler<R>(
    storage: MockStorage,
    f: impl FnOnce(&mut TestScheduler<'_>, &EffectCounters) -> R,
) -> R {
    let counters = EffectCounters::default();
    let mut effects = effects(&counters);
    let [a, b, c, d, e] = &mut effects;
    let mut entries = [
        EffectEntry::new(DESCRIPTORS[0], a),
        EffectEntry::new(DESCRIPTORS[1], b),
        EffectEntry::new(DESCRIPTORS[2], c),
        EffectEntry::new(DESCRIPTORS[3], d),
        EffectEntry::new(DESCRIPTORS[4], e),
    ];
    let catalog = PlaylistCatalog::new(&MASTER, &STARTS, PLAYLIST_NAMES).unwrap();
    let mut device = DeviceContext::new(
        DeviceConfig::default(),
        EffectRegistry::new(&mut entries),
        catalog,
        storage,
        MockClock::default(),
        MockPower::default(),
    )
    .unwrap();
    device.boot();
    let mut scheduler = RenderScheduler::new(device, MockSerial::default(), MockTicks::default());
    f(&mut scheduler, &counters)
}

/// Request header addressed to the fixture device
pub fn header(cluster: u16, command: u8) -> PacketHeader {
    PacketHeader {
        channel: ZCL_CHANNEL,
        address: FACTORY_ADDRESS,
        endpoint: DEFAULT_ENDPOINT,
        profile: DEFAULT_PROFILE,
        cluster,
        flags: 0,
        transaction_id: 0x5A,
        command,
    }
}

/// Frame payload: header followed by attribute data
pub fn request(header: PacketHeader, body: &[u8]) -> Vec<u8, 64> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&header.to_bytes()).unwrap();
    payload.extend_from_slice(body).unwrap();
    payload
}

/// Check a response frame and return its payload
pub fn decode_response(wire: &[u8], variant: CrcVariant) -> Vec<u8, 2048> {
    assert!(wire.len() >= 10, "response too short");
    assert_eq!(&wire[..2], b"S0");

    let pair = |i: usize| hex::decode_pair(wire[i], wire[i + 1]).unwrap();
    let length = u16::from_le_bytes([pair(2), pair(4)]) as usize;
    assert_eq!(wire.len(), 6 + 2 * length + 4, "length field mismatch");

    let mut payload = Vec::new();
    for i in 0..length {
        payload.push(pair(6 + 2 * i)).unwrap();
    }
    let crc_at = 6 + 2 * length;
    let crc = u16::from_le_bytes([pair(crc_at), pair(crc_at + 2)]);
    assert_eq!(crc, variant.checksum(&payload), "CRC mismatch");
    payload
}

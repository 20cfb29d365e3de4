//! Bounded IOC (inter-task communication) channels: ring buffer with
//! overwrite-on-full and multi-receiver event notification (§4.6).

use crate::config::{IOC_BUFFER_SIZE, IOC_MAX_DATA_SIZE, MAX_IOC_CHANNELS, MAX_IOC_RECEIVERS};
use crate::status::StatusType;
use crate::sync::CriticalSection;
use crate::task::TaskId;

pub type IocChannelId = usize;

/// Static, build-time description of one channel, supplied to [`configure`].
#[derive(Clone, Copy)]
pub struct IocChannelConfig {
    pub data_size: usize,
    pub receivers: &'static [TaskId],
}

#[derive(Clone, Copy)]
struct Slot {
    bytes: [u8; IOC_MAX_DATA_SIZE],
}

impl Slot {
    const fn empty() -> Self {
        Self { bytes: [0; IOC_MAX_DATA_SIZE] }
    }
}

#[derive(Clone, Copy)]
struct IocChannelRecord {
    data_size: usize,
    buffer: [Slot; IOC_BUFFER_SIZE],
    head: usize,
    tail: usize,
    count: usize,
    receivers: [Option<TaskId>; MAX_IOC_RECEIVERS],
    receiver_count: usize,
    new_flag: bool,
    configured: bool,
}

impl IocChannelRecord {
    const fn unconfigured() -> Self {
        Self {
            data_size: 0,
            buffer: [Slot::empty(); IOC_BUFFER_SIZE],
            head: 0,
            tail: 0,
            count: 0,
            receivers: [None; MAX_IOC_RECEIVERS],
            receiver_count: 0,
            new_flag: false,
            configured: false,
        }
    }
}

static CHANNELS: CriticalSection<[IocChannelRecord; MAX_IOC_CHANNELS]> =
    CriticalSection::new([IocChannelRecord::unconfigured(); MAX_IOC_CHANNELS]);

/// Configures one channel: clears all state, records `data_size` and the
/// receiver list.
pub fn init_channel(ch: IocChannelId, cfg: IocChannelConfig) -> StatusType {
    if ch >= MAX_IOC_CHANNELS || cfg.data_size > IOC_MAX_DATA_SIZE {
        return crate::status::report(StatusType::InvalidId);
    }
    let mut receivers = [None; MAX_IOC_RECEIVERS];
    let n = cfg.receivers.len().min(MAX_IOC_RECEIVERS);
    for i in 0..n {
        receivers[i] = Some(cfg.receivers[i]);
    }
    let mut channels = CHANNELS.lock();
    channels[ch] = IocChannelRecord {
        data_size: cfg.data_size,
        buffer: [Slot::empty(); IOC_BUFFER_SIZE],
        head: 0,
        tail: 0,
        count: 0,
        receivers,
        receiver_count: n,
        new_flag: false,
        configured: true,
    };
    StatusType::Ok
}

pub(crate) fn configure(configs: &[(IocChannelId, IocChannelConfig)]) {
    for &(ch, cfg) in configs {
        init_channel(ch, cfg);
    }
}

/// Copies `data` (`data_size` bytes) into the ring, overwriting the oldest
/// element if full, then raises event bit `1 << ch` on every receiver.
pub fn send(ch: IocChannelId, data: &[u8]) -> StatusType {
    if ch >= MAX_IOC_CHANNELS {
        return crate::status::report(StatusType::InvalidId);
    }
    let (receivers, receiver_count) = {
        let mut channels = CHANNELS.lock();
        let c = &mut channels[ch];
        if !c.configured || data.len() < c.data_size {
            return crate::status::report(StatusType::InvalidValue);
        }
        let n = c.data_size;
        c.buffer[c.head].bytes[..n].copy_from_slice(&data[..n]);
        c.head = (c.head + 1) % IOC_BUFFER_SIZE;
        if c.count == IOC_BUFFER_SIZE {
            c.tail = (c.tail + 1) % IOC_BUFFER_SIZE;
        } else {
            c.count += 1;
        }
        c.new_flag = true;
        (c.receivers, c.receiver_count)
    };

    let mask = 1u32 << (ch as u32 % 32);
    for slot in receivers.iter().take(receiver_count) {
        if let Some(task_id) = slot {
            crate::event::set_event(*task_id, mask);
        }
    }
    StatusType::Ok
}

/// Dequeues one element into `out`. Fails [`StatusType::NoFunc`] if empty,
/// or [`StatusType::InvalidValue`] if `out` is smaller than the channel's
/// `data_size`.
pub fn receive(ch: IocChannelId, out: &mut [u8]) -> StatusType {
    if ch >= MAX_IOC_CHANNELS {
        return crate::status::report(StatusType::InvalidId);
    }
    let mut channels = CHANNELS.lock();
    let c = &mut channels[ch];
    if !c.configured || c.count == 0 {
        return crate::status::report(StatusType::NoFunc);
    }
    let n = c.data_size;
    if out.len() < n {
        return crate::status::report(StatusType::InvalidValue);
    }
    out[..n].copy_from_slice(&c.buffer[c.tail].bytes[..n]);
    c.tail = (c.tail + 1) % IOC_BUFFER_SIZE;
    c.count -= 1;
    if c.count == 0 {
        c.new_flag = false;
    }
    StatusType::Ok
}

/// Atomically dequeues `n` elements into `out` (`n * data_size` bytes).
/// Fails [`StatusType::NoFunc`] without dequeuing anything if fewer than
/// `n` elements are available, or [`StatusType::InvalidValue`] without
/// dequeuing anything if `out` is smaller than `n * data_size`.
pub fn receive_group(ch: IocChannelId, out: &mut [u8], n: usize) -> StatusType {
    if ch >= MAX_IOC_CHANNELS {
        return crate::status::report(StatusType::InvalidId);
    }
    let mut channels = CHANNELS.lock();
    let c = &mut channels[ch];
    if !c.configured || c.count < n {
        return crate::status::report(StatusType::NoFunc);
    }
    let elem = c.data_size;
    if out.len() < n * elem {
        return crate::status::report(StatusType::InvalidValue);
    }
    for i in 0..n {
        out[i * elem..(i + 1) * elem].copy_from_slice(&c.buffer[c.tail].bytes[..elem]);
        c.tail = (c.tail + 1) % IOC_BUFFER_SIZE;
        c.count -= 1;
    }
    if c.count == 0 {
        c.new_flag = false;
    }
    StatusType::Ok
}

/// Returns whether unread data has arrived since the last full drain.
pub fn has_new_data(ch: IocChannelId) -> bool {
    if ch >= MAX_IOC_CHANNELS {
        return false;
    }
    CHANNELS.lock()[ch].new_flag
}

#[cfg(test)]
mod tests {
    use super::*;

    // IOC channels are their own process-wide table, but `send_notifies_
    // all_receivers` below also touches the shared task table, so every
    // test here takes `sched::test_lock()` first.

    #[test]
    fn send_then_receive_round_trips_bytewise() {
        let _guard = crate::sched::test_lock();
        init_channel(0, IocChannelConfig { data_size: 4, receivers: &[] });
        send(0, &[1, 2, 3, 4]);
        let mut out = [0u8; 4];
        assert_eq!(receive(0, &mut out), StatusType::Ok);
        assert_eq!(out, [1, 2, 3, 4]);
    }

    #[test]
    fn receive_on_empty_channel_fails_no_func() {
        let _guard = crate::sched::test_lock();
        init_channel(1, IocChannelConfig { data_size: 1, receivers: &[] });
        let mut out = [0u8; 1];
        assert_eq!(receive(1, &mut out), StatusType::NoFunc);
    }

    #[test]
    fn overflow_overwrites_oldest_and_keeps_fifo_order() {
        let _guard = crate::sched::test_lock();
        init_channel(2, IocChannelConfig { data_size: 1, receivers: &[] });
        for v in 0..(IOC_BUFFER_SIZE as u8 + 2) {
            send(2, &[v]);
        }
        let mut out = [0u8; 1];
        for expected in 2..(IOC_BUFFER_SIZE as u8 + 2) {
            assert_eq!(receive(2, &mut out), StatusType::Ok);
            assert_eq!(out[0], expected);
        }
    }

    #[test]
    fn receive_into_undersized_buffer_is_invalid_value() {
        let _guard = crate::sched::test_lock();
        init_channel(4, IocChannelConfig { data_size: 4, receivers: &[] });
        send(4, &[1, 2, 3, 4]);
        let mut out = [0u8; 2];
        assert_eq!(receive(4, &mut out), StatusType::InvalidValue);
    }

    #[test]
    fn receive_group_into_undersized_buffer_is_invalid_value_and_does_not_drain() {
        let _guard = crate::sched::test_lock();
        init_channel(5, IocChannelConfig { data_size: 2, receivers: &[] });
        send(5, &[1, 1]);
        send(5, &[2, 2]);
        let mut out = [0u8; 2];
        assert_eq!(receive_group(5, &mut out, 2), StatusType::InvalidValue);

        let mut full = [0u8; 4];
        assert_eq!(receive_group(5, &mut full, 2), StatusType::Ok);
        assert_eq!(full, [1, 1, 2, 2]);
    }

    #[test]
    fn send_notifies_all_receivers() {
        let _guard = crate::sched::test_lock();
        crate::task::configure(&[
            (4, crate::task::TaskConfig { entry: || {}, priority: 0, activation_limit: 1, app_id: 0 }),
            (5, crate::task::TaskConfig { entry: || {}, priority: 0, activation_limit: 1, app_id: 0 }),
        ]);
        init_channel(3, IocChannelConfig { data_size: 2, receivers: &[4, 5] });
        send(3, &[9, 9]);
        let mask = 1u32 << 3;
        assert_eq!(crate::event::get_event(4).unwrap() & mask, mask);
        assert_eq!(crate::event::get_event(5).unwrap() & mask, mask);
    }
}

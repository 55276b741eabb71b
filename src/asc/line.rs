//! Line-level decoding of ASC traces.
//!
//! Examples of the layouts handled here:
//!
//! ```text
//! date Mon Mar 10 12:34:56.789 pm 2025
//! base hex  timestamps absolute
//! 0.016728 1  17334410x       Rx   d 8 3E 42 03 00 39 00 03 01
//! 0.016728 1  7C1  Rx  Gateway  d 4 6C 0D 01 00
//! 0.020000 1  123  Tx   r 8
//! 0.030000 1  ErrorFrame
//! 0.040000 1  OverloadFrame
//! 0.050000 CAN 1 Status:chip status error passive - TxErr: 128 RxErr: 0
//! 0.060000 CANFD 1 Rx 456 Engine 1 0 8 8 11 22 33 44 55 66 77 88 130000 130 1000 0 0 0 0 0
//! 0.070000 CANFD 1 Rx ErrorFrame 0 1 0 0 0 0 80 0
//! 0.080000 ETH 1 Tx 14:ffffffffffff0011223344550800
//! 0.090000 ETH 1 RxError 14:ffffffffffff0011223344550800 fcs:DEADBEEF
//! ```

use tracing::warn;

use super::date::{date_text, parse_date};
use super::event::{
    CanBusError, CanErrorFrame, CanFdErrorFrame, CanFdMessage, CanMessage, CanOverloadFrame,
    CanRemoteFrame, Direction, EthernetPacket, EthernetRxError, Event, FileDate, UnsupportedEvent,
};
use crate::can::{CAN_ID_MASK, MAX_CLASSIC_DATA_LEN};

type LineResult<T> = core::result::Result<T, String>;

/// Reader state set by the `base ... timestamps ...` header.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LineContext {
    /// Radix of identifiers and CAN data bytes (16 or 10).
    pub radix: u32,
    /// Event times are deltas from the previous event.
    pub relative: bool,
    last_time: f64,
}

impl Default for LineContext {
    fn default() -> Self {
        Self {
            radix: 16,
            relative: false,
            last_time: 0.0,
        }
    }
}

impl LineContext {
    fn event_time(&mut self, raw: f64) -> f64 {
        let time = if self.relative {
            self.last_time + raw
        } else {
            raw
        };
        self.last_time = time;
        time
    }
}

/// Decode one trace line.
///
/// Returns `Ok(None)` for lines that carry no event (blank lines, comments,
/// headers), and `Err` with a reason for lines that match a known layout but
/// cannot be decoded.
pub(crate) fn parse_line(line: &str, ctx: &mut LineContext) -> LineResult<Option<Event>> {
    let tokens: Vec<&str> = line.split_ascii_whitespace().collect();
    let Some(&first) = tokens.first() else {
        return Ok(None);
    };
    if first.starts_with("//") {
        return Ok(None);
    }
    if let Some(text) = date_text(line) {
        return Ok(Some(file_date(text)));
    }
    if first == "base" {
        parse_base_header(&tokens, ctx)?;
        return Ok(None);
    }

    // everything else that is an event starts with a timestamp
    let Ok(raw_time) = first.parse::<f64>() else {
        return Ok(None);
    };
    let time = ctx.event_time(raw_time);

    let Some(&second) = tokens.get(1) else {
        return Ok(Some(unsupported(time, "")));
    };
    let event = match second {
        "CANFD" => parse_canfd(&tokens, time, ctx.radix)?,
        "CAN" => parse_can_status(&tokens, time)?,
        "ETH" => parse_ethernet(&tokens, time)?,
        _ => match second.parse::<u16>() {
            Ok(channel) => parse_can(&tokens, time, channel, ctx.radix)?,
            Err(_) => unsupported(time, second),
        },
    };
    Ok(Some(event))
}

fn file_date(text: String) -> Event {
    match parse_date(&text) {
        Ok(date) => Event::FileDate(FileDate { date }),
        Err(e) => {
            warn!(error = %e, "ignoring date header");
            unsupported(0.0, "date")
        }
    }
}

fn unsupported(time: f64, keyword: &str) -> Event {
    Event::Unsupported(UnsupportedEvent {
        time,
        keyword: keyword.to_string(),
    })
}

// base hex  timestamps absolute
fn parse_base_header(tokens: &[&str], ctx: &mut LineContext) -> LineResult<()> {
    match tokens.get(1).copied() {
        Some("hex") => ctx.radix = 16,
        Some("dec") => ctx.radix = 10,
        other => return Err(format!("unknown number base {other:?}")),
    }
    if let Some(pos) = tokens.iter().position(|t| *t == "timestamps") {
        match tokens.get(pos + 1).copied() {
            Some("absolute") => ctx.relative = false,
            Some("relative") => ctx.relative = true,
            other => return Err(format!("unknown timestamp mode {other:?}")),
        }
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// field helpers
// ----------------------------------------------------------------------------

fn token<'a>(tokens: &[&'a str], idx: usize, what: &str) -> LineResult<&'a str> {
    tokens
        .get(idx)
        .copied()
        .ok_or_else(|| format!("missing {what}"))
}

fn parse_channel(tok: &str) -> LineResult<u16> {
    tok.parse()
        .map_err(|_| format!("invalid channel {tok:?}"))
}

fn parse_direction(tok: &str) -> LineResult<Direction> {
    Direction::from_token(tok).ok_or_else(|| format!("invalid direction {tok:?}"))
}

fn parse_u8(tok: &str, radix: u32, what: &str) -> LineResult<u8> {
    u8::from_str_radix(tok, radix).map_err(|_| format!("invalid {what} {tok:?}"))
}

fn parse_hex_u32(tok: &str, what: &str) -> LineResult<u32> {
    let digits = tok
        .strip_prefix("0x")
        .or_else(|| tok.strip_prefix("0X"))
        .unwrap_or(tok);
    u32::from_str_radix(digits, 16).map_err(|_| format!("invalid {what} {tok:?}"))
}

fn is_bit(tok: &str) -> bool {
    tok == "0" || tok == "1"
}

/// Identifier with optional `x` suffix marking a 29-bit id.
fn parse_id(tok: &str, radix: u32) -> LineResult<(u32, bool)> {
    let (digits, extended) = match tok.strip_suffix(['x', 'X']) {
        Some(digits) => (digits, true),
        None => (tok, false),
    };
    let id = u32::from_str_radix(digits, radix).map_err(|_| format!("invalid id {tok:?}"))?;
    if id > CAN_ID_MASK {
        return Err(format!("id {tok:?} exceeds 29 bits"));
    }
    Ok((id, extended))
}

fn parse_data(tokens: &[&str], start: usize, count: usize, radix: u32) -> LineResult<Vec<u8>> {
    let end = start + count;
    if end > tokens.len() {
        return Err(format!(
            "expected {count} data bytes, found {}",
            tokens.len().saturating_sub(start)
        ));
    }
    tokens[start..end]
        .iter()
        .map(|tok| parse_u8(tok, radix, "data byte"))
        .collect()
}

// ----------------------------------------------------------------------------
// classic CAN
// ----------------------------------------------------------------------------

// <t> <ch> <id>[x] <dir> [name...] d <dlc> <data...>
// <t> <ch> <id>[x] <dir> r [<dlc>]
// <t> <ch> ErrorFrame
// <t> <ch> OverloadFrame
fn parse_can(tokens: &[&str], time: f64, channel: u16, radix: u32) -> LineResult<Event> {
    let keyword = token(tokens, 2, "identifier")?;
    match keyword {
        "ErrorFrame" => {
            return Ok(Event::CanErrorFrame(CanErrorFrame {
                time,
                channel,
                id: 0,
                dlc: 0,
            }));
        }
        "OverloadFrame" => {
            return Ok(Event::CanOverloadFrame(CanOverloadFrame { time, channel }));
        }
        _ => {}
    }

    let Some(dir) = tokens.get(3).and_then(|t| Direction::from_token(t)) else {
        return Ok(unsupported(time, keyword));
    };
    let (id, extended) = parse_id(keyword, radix)?;

    // optional symbolic names sit between the direction and the marker
    let marker = tokens[4..]
        .iter()
        .position(|t| matches!(*t, "d" | "D" | "r" | "R"))
        .map(|off| 4 + off)
        .ok_or_else(|| String::from("missing 'd' or 'r' marker"))?;

    if tokens[marker].eq_ignore_ascii_case("r") {
        let dlc = tokens
            .get(marker + 1)
            .and_then(|t| u8::from_str_radix(t, radix).ok())
            .unwrap_or(0);
        return Ok(Event::CanRemoteFrame(CanRemoteFrame {
            time,
            channel,
            id,
            extended,
            dir,
            dlc,
        }));
    }

    let dlc = parse_u8(token(tokens, marker + 1, "dlc")?, radix, "dlc")?;
    let count = (dlc as usize).min(MAX_CLASSIC_DATA_LEN);
    let data = parse_data(tokens, marker + 2, count, radix)?;
    let msg = CanMessage {
        time,
        channel,
        id,
        dir,
        dlc,
        data,
    };
    Ok(if extended {
        Event::CanExtendedMessage(msg)
    } else {
        Event::CanMessage(msg)
    })
}

// <t> CAN <ch> Status:<text...> [TxErr: <n>] [RxErr: <n>]
fn parse_can_status(tokens: &[&str], time: f64) -> LineResult<Event> {
    let channel = parse_channel(token(tokens, 2, "channel")?)?;
    let head = token(tokens, 3, "status")?;
    let Some(first_word) = head.strip_prefix("Status:") else {
        return Ok(unsupported(time, head));
    };

    let mut words: Vec<&str> = Vec::new();
    if !first_word.is_empty() {
        words.push(first_word);
    }
    let mut tx_errors = 0;
    let mut rx_errors = 0;
    let mut idx = 4;
    while idx < tokens.len() {
        let tok = tokens[idx];
        let counter = if tok.starts_with("TxErr:") {
            Some(("TxErr:", &mut tx_errors))
        } else if tok.starts_with("RxErr:") {
            Some(("RxErr:", &mut rx_errors))
        } else {
            None
        };
        match counter {
            Some((label, slot)) => {
                // value is either glued to the label or the next token
                let inline = &tok[label.len()..];
                let value = if inline.is_empty() {
                    idx += 1;
                    token(tokens, idx, label)?
                } else {
                    inline
                };
                *slot = value
                    .parse()
                    .map_err(|_| format!("invalid {label} count {value:?}"))?;
            }
            None if tok != "-" => words.push(tok),
            None => {}
        }
        idx += 1;
    }

    Ok(Event::CanBusError(CanBusError {
        time,
        channel,
        status: words.join(" "),
        tx_errors,
        rx_errors,
    }))
}

// ----------------------------------------------------------------------------
// CAN FD
// ----------------------------------------------------------------------------

/// Fields following the identifier (or `ErrorFrame`) on a CANFD line.
struct FdTail {
    brs: bool,
    esi: bool,
    dlc: u8,
    data: Vec<u8>,
    /// Hex words after duration and bit count: flags, then crc or flags2.
    words: [Option<u32>; 2],
}

// <brs> <esi> <dlc> <len> <data...> <duration> <bitcount> <word> [<word>]
fn parse_fd_tail(tokens: &[&str], start: usize, radix: u32) -> LineResult<FdTail> {
    let brs = tokens[start] == "1";
    let esi = tokens[start + 1] == "1";
    let dlc = u8::from_str_radix(token(tokens, start + 2, "dlc")?, 16)
        .ok()
        .filter(|dlc| *dlc <= 15)
        .ok_or_else(|| format!("invalid dlc {:?}", tokens[start + 2]))?;
    let len_tok = token(tokens, start + 3, "data length")?;
    let len: usize = len_tok
        .parse()
        .ok()
        .filter(|len| *len <= crate::can::MAX_FD_DATA_LEN)
        .ok_or_else(|| format!("invalid data length {len_tok:?}"))?;
    let data = parse_data(tokens, start + 4, len, radix)?;

    // message duration and bit count are not needed
    let mut words = [None; 2];
    let first_word = start + 4 + len + 2;
    for (slot, idx) in words.iter_mut().zip(first_word..) {
        if let Some(tok) = tokens.get(idx) {
            *slot = Some(parse_hex_u32(tok, "flags")?);
        }
    }

    Ok(FdTail {
        brs,
        esi,
        dlc,
        data,
        words,
    })
}

/// Index of the `<brs> <esi>` pair, skipping symbolic names or error text.
fn find_fd_tail(tokens: &[&str], from: usize) -> Option<usize> {
    (from..tokens.len().saturating_sub(1)).find(|&i| is_bit(tokens[i]) && is_bit(tokens[i + 1]))
}

// <t> CANFD <ch> <dir> <id>[x] [name...] <tail>
// <t> CANFD <ch> <dir> ErrorFrame [text...] <tail>
fn parse_canfd(tokens: &[&str], time: f64, radix: u32) -> LineResult<Event> {
    let channel = parse_channel(token(tokens, 2, "channel")?)?;
    let dir = parse_direction(token(tokens, 3, "direction")?)?;
    let keyword = token(tokens, 4, "identifier")?;

    if keyword == "ErrorFrame" {
        let frame = match find_fd_tail(tokens, 5) {
            Some(start) => {
                let tail = parse_fd_tail(tokens, start, radix)?;
                CanFdErrorFrame {
                    time,
                    channel,
                    id: 0,
                    dir,
                    brs: tail.brs,
                    esi: tail.esi,
                    dlc: tail.dlc,
                    data: tail.data,
                    flags1: tail.words[0].unwrap_or(0) as u16,
                    flags2: tail.words[1].unwrap_or(0) as u16,
                }
            }
            None => CanFdErrorFrame {
                time,
                channel,
                id: 0,
                dir,
                brs: false,
                esi: false,
                dlc: 0,
                data: Vec::new(),
                flags1: 0,
                flags2: 0,
            },
        };
        return Ok(Event::CanFdErrorFrame(frame));
    }

    let (id, extended) = parse_id(keyword, radix)?;
    let start = find_fd_tail(tokens, 5).ok_or_else(|| String::from("missing BRS/ESI fields"))?;
    let tail = parse_fd_tail(tokens, start, radix)?;
    let msg = CanFdMessage {
        time,
        channel,
        id,
        dir,
        brs: tail.brs,
        esi: tail.esi,
        dlc: tail.dlc,
        data: tail.data,
        flags: tail.words[0].unwrap_or(0),
    };
    Ok(if extended {
        Event::CanFdExtendedMessage(msg)
    } else {
        Event::CanFdMessage(msg)
    })
}

// ----------------------------------------------------------------------------
// Ethernet
// ----------------------------------------------------------------------------

// <len>:<hex bytes>
fn parse_eth_frame(tok: &str) -> LineResult<Vec<u8>> {
    let (len, payload) = tok
        .split_once(':')
        .ok_or_else(|| format!("invalid Ethernet frame {tok:?}"))?;
    let len: usize = len
        .parse()
        .map_err(|_| format!("invalid Ethernet length {len:?}"))?;
    let data = hex::decode(payload).map_err(|e| format!("invalid Ethernet data: {e}"))?;
    if data.len() != len {
        return Err(format!(
            "Ethernet length {len} does not match {} data bytes",
            data.len()
        ));
    }
    Ok(data)
}

// <t> ETH <ch> <dir> <len>:<hex>
// <t> ETH <ch> RxError <len>:<hex> [fcs:]<fcs>
fn parse_ethernet(tokens: &[&str], time: f64) -> LineResult<Event> {
    let channel = parse_channel(token(tokens, 2, "channel")?)?;
    let kind = token(tokens, 3, "direction")?;

    if kind.eq_ignore_ascii_case("RxError") {
        let data = parse_eth_frame(token(tokens, 4, "Ethernet frame")?)?;
        let fcs = token(tokens, 5, "frame checksum")?;
        let fcs = fcs
            .get(..4)
            .filter(|prefix| prefix.eq_ignore_ascii_case("fcs:"))
            .map_or(fcs, |_| &fcs[4..]);
        let frame_checksum = parse_hex_u32(fcs, "frame checksum")?;
        return Ok(Event::EthernetRxError(EthernetRxError {
            time,
            channel,
            data,
            frame_checksum,
        }));
    }

    let dir = parse_direction(kind)?;
    let data = parse_eth_frame(token(tokens, 4, "Ethernet frame")?)?;
    Ok(Event::EthernetPacket(EthernetPacket {
        time,
        channel,
        dir,
        data,
    }))
}

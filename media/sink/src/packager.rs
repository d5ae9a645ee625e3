/*!
    Packaging of encoded units into a raw stream or container packets.
*/

use std::{fmt, io::Write};

use media_types::{EncodedUnit, Error, Packet, Pts, Result, bitstream};

use crate::{Muxer, SinkConfig, StreamConfig};

enum Output<'a> {
    Raw(Box<dyn Write + 'a>),
    Fragmented(Box<dyn Muxer + 'a>),
}

/**
    Counters accumulated by a [`Packager`].
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackagerStats {
    /// Units written, header units included.
    pub units: u64,
    /// Packets handed to the muxer. Always zero in raw mode.
    pub packets: u64,
    /// Packets marked as keyframes.
    pub keyframes: u64,
    /// Payload bytes written, framing included.
    pub bytes: u64,
}

/**
    Packager for the units of one encoded stream.

    Call [`start`](Packager::start) with the header units, then
    [`write_frame`](Packager::write_frame) for each submitted frame,
    [`write_flushed`](Packager::write_flushed) for each batch drained from
    the encoder, and finally [`finish`](Packager::finish).
*/
pub struct Packager<'a> {
    output: Output<'a>,
    config: SinkConfig,
    last_pts: Option<Pts>,
    started: bool,
    finished: bool,
    stats: PackagerStats,
}

impl<'a> Packager<'a> {
    /**
        Create a packager writing a raw Annex-B stream.
    */
    pub fn raw(writer: impl Write + 'a, config: SinkConfig) -> Self {
        Self::with_output(Output::Raw(Box::new(writer)), config)
    }

    /**
        Create a packager feeding packets to a container muxer.
    */
    pub fn fragmented(muxer: impl Muxer + 'a, config: SinkConfig) -> Self {
        Self::with_output(Output::Fragmented(Box::new(muxer)), config)
    }

    fn with_output(output: Output<'a>, config: SinkConfig) -> Self {
        Self {
            output,
            config,
            last_pts: None,
            started: false,
            finished: false,
            stats: PackagerStats::default(),
        }
    }

    /**
        The configuration this packager was created with.
    */
    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    /**
        Timestamp of the last packet written, if any.
    */
    pub fn last_pts(&self) -> Option<Pts> {
        self.last_pts
    }

    pub fn stats(&self) -> PackagerStats {
        self.stats
    }

    /**
        Write the header units.

        In raw mode they are written to the stream. Otherwise they become the
        muxer's codec configuration and the container header is written.
    */
    pub fn start(&mut self, headers: &[EncodedUnit]) -> Result<()> {
        if self.started {
            return Err(Error::mux_write("packager already started"));
        }
        self.started = true;

        match &mut self.output {
            Output::Raw(_) => self.write_raw(headers),
            Output::Fragmented(muxer) => {
                let mut header_block = Vec::new();
                for unit in headers {
                    bitstream::push_length_prefixed(&mut header_block, &unit.payload);
                }
                let stream = StreamConfig {
                    codec: self.config.codec,
                    width: self.config.width,
                    height: self.config.height,
                    time_base: self.config.time_base,
                    bit_rate: self.config.bit_rate,
                    header_block,
                };
                muxer.configure(&stream)?;
                self.stats.units += headers.len() as u64;
                tracing::debug!(
                    header_units = headers.len(),
                    header_bytes = stream.header_block.len(),
                    "configured muxer"
                );
                Ok(())
            }
        }
    }

    /**
        Write the units emitted for one submitted frame.

        In fragmented mode the picture units become one packet stamped with
        `pts`. A timestamp that does not advance past the previous packet is
        moved to one frame after it. Frames without picture units produce no
        packet.
    */
    pub fn write_frame(&mut self, units: &[EncodedUnit], pts: Pts) -> Result<()> {
        self.check_writable()?;

        if let Output::Raw(_) = self.output {
            return self.write_raw(units);
        }

        let pts = match self.last_pts {
            Some(last) if pts <= last => {
                let bumped = last + self.config.frame_duration;
                tracing::warn!(
                    pts = pts.0,
                    last = last.0,
                    bumped = bumped.0,
                    "packet timestamp did not advance"
                );
                bumped
            }
            _ => pts,
        };
        self.write_packet(units, pts)
    }

    /**
        Write units drained from the encoder after the last frame.

        In fragmented mode each call produces one packet stamped one frame
        after the previous packet.
    */
    pub fn write_flushed(&mut self, units: &[EncodedUnit]) -> Result<()> {
        self.check_writable()?;

        if let Output::Raw(_) = self.output {
            return self.write_raw(units);
        }

        let pts = self
            .last_pts
            .map_or(Pts::ZERO, |last| last + self.config.frame_duration);
        self.write_packet(units, pts)
    }

    /**
        Flush the raw stream or finalize the container.

        Calling this more than once is a no-op.
    */
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        match &mut self.output {
            Output::Raw(writer) => writer
                .flush()
                .map_err(|e| Error::mux_write(format!("failed to flush output: {e}")))?,
            Output::Fragmented(muxer) => muxer.close()?,
        }

        tracing::debug!(
            units = self.stats.units,
            packets = self.stats.packets,
            keyframes = self.stats.keyframes,
            bytes = self.stats.bytes,
            "finished packaging"
        );
        Ok(())
    }

    fn check_writable(&self) -> Result<()> {
        if !self.started {
            Err(Error::mux_write("packager has not been started"))
        } else if self.finished {
            Err(Error::mux_write("packager is already finished"))
        } else {
            Ok(())
        }
    }

    fn write_raw(&mut self, units: &[EncodedUnit]) -> Result<()> {
        let Output::Raw(writer) = &mut self.output else {
            return Err(Error::mux_write("raw write on a container output"));
        };
        for unit in units {
            writer
                .write_all(&bitstream::START_CODE)
                .and_then(|()| writer.write_all(&unit.payload))
                .map_err(|e| Error::mux_write(format!("failed to write unit: {e}")))?;
            self.stats.units += 1;
            self.stats.bytes += (bitstream::START_CODE.len() + unit.len()) as u64;
        }
        Ok(())
    }

    fn write_packet(&mut self, units: &[EncodedUnit], pts: Pts) -> Result<()> {
        let Output::Fragmented(muxer) = &mut self.output else {
            return Err(Error::mux_write("packet write on a raw output"));
        };

        let mut data = Vec::new();
        let mut is_keyframe = false;
        let mut count = 0;
        for unit in units.iter().filter(|unit| !unit.is_header()) {
            bitstream::push_length_prefixed(&mut data, &unit.payload);
            is_keyframe |= unit.is_random_access();
            count += 1;
        }
        if count == 0 {
            return Ok(());
        }

        let packet = Packet::new(
            data,
            pts,
            self.config.frame_duration,
            self.config.time_base,
            is_keyframe,
        );
        muxer.write_packet(&packet)?;

        self.last_pts = Some(pts);
        self.stats.units += count;
        self.stats.packets += 1;
        self.stats.keyframes += u64::from(is_keyframe);
        self.stats.bytes += packet.data.len() as u64;
        Ok(())
    }
}

impl fmt::Debug for Packager<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.output {
            Output::Raw(_) => "raw",
            Output::Fragmented(_) => "fragmented",
        };
        f.debug_struct("Packager")
            .field("mode", &mode)
            .field("config", &self.config)
            .field("last_pts", &self.last_pts)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

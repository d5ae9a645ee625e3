/*!
    Elementary stream packaging and muxing for the monoeye media crates.

    This crate handles the output side of the pipeline. It takes the units an
    encoder emits for each submitted frame and either writes them as a raw
    Annex-B elementary stream or groups them into timestamped packets for a
    container muxer.

    # Basic Usage

    ```ignore
    use media_sink::{FragmentedMp4Muxer, Packager, SinkConfig};

    let config = SinkConfig::new(CodecId::H265, Rational::per_second(48000), MediaDuration(960))
        .with_dimensions(200, 200);

    let mut packager = Packager::fragmented(FragmentedMp4Muxer::create("left.mp4")?, config);

    packager.start(&encoder.headers()?)?;
    for (units, pts) in encoded_frames {
        packager.write_frame(&units, pts)?;
    }
    while let Some(units) = encoder.flush()? {
        packager.write_flushed(&units)?;
    }

    // Finalize the container (critical!)
    packager.finish()?;
    ```

    # Output Modes

    - **Raw**: every unit is written with a 4-byte start code, in emission
      order, with no timing information.
    - **Fragmented MP4**: header units become the codec configuration, and
      the picture units of each submitted frame become one length-prefixed
      packet with the frame's timestamp.

    The mode follows the output path, see [`ContainerFormat::from_path`].
*/

pub use media_types::{
    CodecId, EncodedUnit, Error, MediaDuration, Packet, Pts, Rational, Result,
};

mod config;
mod mp4;
mod packager;

pub use config::{ContainerFormat, SinkConfig, StreamConfig};
pub use mp4::FragmentedMp4Muxer;
pub use packager::{Packager, PackagerStats};

/**
    A container writer accepting timestamped packets.

    The call order is [`configure`](Muxer::configure) once, then any number
    of [`write_packet`](Muxer::write_packet), then [`close`](Muxer::close).
*/
pub trait Muxer {
    /**
        Describe the single video stream and write the container header.
    */
    fn configure(&mut self, stream: &StreamConfig) -> Result<()>;

    /**
        Write one packet. Packets arrive with increasing timestamps.
    */
    fn write_packet(&mut self, packet: &Packet) -> Result<()>;

    /**
        Finalize the container. Closing twice is a no-op.
    */
    fn close(&mut self) -> Result<()>;
}

impl<M: Muxer + ?Sized> Muxer for &mut M {
    fn configure(&mut self, stream: &StreamConfig) -> Result<()> {
        (**self).configure(stream)
    }

    fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        (**self).write_packet(packet)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<M: Muxer + ?Sized> Muxer for Box<M> {
    fn configure(&mut self, stream: &StreamConfig) -> Result<()> {
        (**self).configure(stream)
    }

    fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        (**self).write_packet(packet)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

//! Binary layout of a keyframe container.
//!
//! All fields are big-endian:
//!
//! ```text
//! i32 channels
//! i32 key count
//! i32 interpolation tag
//! key count x { f32 time, channels x f32 value }
//! ```
//!
//! Neither the data kind nor the end behaviour is stored; readers supply the
//! data kind and get the default end behaviour.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::container::KeyFrameContainer;
use crate::error::KeyframeError;
use crate::keyframe::{DataKind, InterpolationType, KeyFrame, MAX_CHANNELS};

/// Writes `container` in ascending key order.
pub fn write_container<W: Write>(
    writer: &mut W,
    container: &KeyFrameContainer,
) -> Result<(), KeyframeError> {
    let channels = container.channels();
    let keys = container.keys();
    let key_count = i32::try_from(keys.len()).map_err(|_| KeyframeError::Serialization {
        reason: format!("{} keys do not fit the key count field", keys.len()),
    })?;

    writer.write_i32::<BigEndian>(channels as i32)?;
    writer.write_i32::<BigEndian>(key_count)?;
    writer.write_i32::<BigEndian>(container.interpolation().as_tag())?;
    for key in keys.iter() {
        writer.write_f32::<BigEndian>(key.time)?;
        for &value in &key.channels()[..channels] {
            writer.write_f32::<BigEndian>(value)?;
        }
    }
    Ok(())
}

/// Encodes `container` into a fresh buffer.
pub fn encode_container(container: &KeyFrameContainer) -> Result<Vec<u8>, KeyframeError> {
    let mut buf = Vec::with_capacity(12 + container.key_count() * (1 + container.channels()) * 4);
    write_container(&mut buf, container)?;
    Ok(buf)
}

/// Reads a container written by [`write_container`]. Every key takes the
/// stored container tag.
pub fn read_container<R: Read>(
    reader: &mut R,
    data: DataKind,
) -> Result<KeyFrameContainer, KeyframeError> {
    let channels = reader.read_i32::<BigEndian>()?;
    let channels = usize::try_from(channels)
        .map_err(|_| KeyframeError::InvalidChannelCount { channels: 0 })?;
    let mut container = KeyFrameContainer::new(channels, data)?;

    let key_count = reader.read_i32::<BigEndian>()?;
    let key_count = usize::try_from(key_count).map_err(|_| KeyframeError::Serialization {
        reason: format!("negative key count {key_count}"),
    })?;
    let interpolation = InterpolationType::try_from(reader.read_i32::<BigEndian>()?)?;

    let mut values = [0.0f32; MAX_CHANNELS];
    for _ in 0..key_count {
        let time = reader.read_f32::<BigEndian>()?;
        for value in values[..channels].iter_mut() {
            *value = reader.read_f32::<BigEndian>()?;
        }
        container.insert_key(KeyFrame::new(time, interpolation, &values[..channels])?);
    }
    Ok(container)
}

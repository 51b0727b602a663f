//! Compound (structured array) datasets whose field names are data,
//! e.g., one field per regulon. The typed `hdf5` readers need the record
//! layout at compile time, so the records are pulled out as raw bytes in
//! the file's own (native-order) layout and decoded field by field.

use crate::misc::ScalarSource;
use hdf5::types::{FloatSize, IntSize, TypeDescriptor};
use hdf5::Datatype;
use hdf5_sys::h5p::H5P_DEFAULT;
use hdf5_sys::h5s::H5S_ALL;

/// Column-wise view of a 1-d compound dataset
#[derive(Debug, Clone)]
pub struct CompoundColumns {
    /// field names in the stored order
    pub names: Vec<Box<str>>,
    /// `values[k][i]` is field `k` of record `i`
    pub values: Vec<Vec<f64>>,
    pub num_records: usize,
}

/// Read a 1-d compound dataset of numeric fields as columns of `f64`
pub fn read_compound_columns(ds: &hdf5::Dataset) -> anyhow::Result<CompoundColumns> {
    let desc = ds.dtype()?.to_descriptor()?;

    let compound = match &desc {
        TypeDescriptor::Compound(compound) => compound.clone(),
        other => {
            return Err(anyhow::anyhow!(
                "{} is not a compound dataset: {:?}",
                ds.name(),
                other
            ));
        }
    };

    if ds.ndim() != 1 {
        return Err(anyhow::anyhow!(
            "{} should be a 1-d array of records, found shape {:?}",
            ds.name(),
            ds.shape()
        ));
    }

    let num_records = ds.size();
    let record_size = compound.size;

    let bytes = read_raw_bytes(&ScalarSource::Dataset(ds.clone()), &desc)?;
    debug_assert_eq!(bytes.len(), num_records * record_size);

    let mut fields = compound.fields.clone();
    fields.sort_by_key(|f| f.index);

    let mut names = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());

    for field in fields.iter() {
        let column = (0..num_records)
            .map(|i| {
                let start = i * record_size + field.offset;
                decode_number(&bytes[start..], &field.ty)
            })
            .collect::<anyhow::Result<Vec<f64>>>()
            .map_err(|e| anyhow::anyhow!("field `{}` of {}: {}", field.name, ds.name(), e))?;

        names.push(field.name.clone().into_boxed_str());
        values.push(column);
    }

    Ok(CompoundColumns {
        names,
        values,
        num_records,
    })
}

/// Read the whole content of a dataset or an attribute into a byte
/// buffer laid out as the native version of `desc`
pub fn read_raw_bytes(source: &ScalarSource, desc: &TypeDescriptor) -> anyhow::Result<Vec<u8>> {
    let mem_type = Datatype::from_descriptor(desc)?;
    let elem_size = mem_type.size();

    let npoints = match source {
        ScalarSource::Dataset(ds) => ds.size(),
        ScalarSource::Attribute(attr) => attr.size(),
    };

    let mut buf = vec![0_u8; npoints * elem_size];

    if buf.is_empty() {
        return Ok(buf);
    }

    let status = {
        let _guard = hdf5_sys::LOCK.lock();
        // SAFETY: `buf` holds `npoints` elements of `mem_type`, which has
        // no variable-length members, and the ids outlive the call.
        unsafe {
            match source {
                ScalarSource::Dataset(ds) => hdf5_sys::h5d::H5Dread(
                    ds.id(),
                    mem_type.id(),
                    H5S_ALL,
                    H5S_ALL,
                    H5P_DEFAULT,
                    buf.as_mut_ptr().cast(),
                ),
                ScalarSource::Attribute(attr) => {
                    hdf5_sys::h5a::H5Aread(attr.id(), mem_type.id(), buf.as_mut_ptr().cast())
                }
            }
        }
    };

    if status < 0 {
        return Err(anyhow::anyhow!("H5Dread/H5Aread failed for {:?}", desc));
    }

    Ok(buf)
}

fn decode_number(bytes: &[u8], ty: &TypeDescriptor) -> anyhow::Result<f64> {
    fn take<const N: usize>(bytes: &[u8]) -> anyhow::Result<[u8; N]> {
        bytes
            .get(..N)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| anyhow::anyhow!("record too short"))
    }

    let ret = match ty {
        TypeDescriptor::Float(FloatSize::U8) => f64::from_ne_bytes(take::<8>(bytes)?),
        TypeDescriptor::Float(FloatSize::U4) => f32::from_ne_bytes(take::<4>(bytes)?) as f64,
        TypeDescriptor::Integer(size) => decode_int(bytes, size, true)?,
        TypeDescriptor::Unsigned(size) => decode_int(bytes, size, false)?,
        TypeDescriptor::Enum(enum_type) => decode_int(bytes, &enum_type.size, enum_type.signed)?,
        TypeDescriptor::Boolean => take::<1>(bytes)?[0] as f64,
        other => {
            return Err(anyhow::anyhow!("non-numeric field type {:?}", other));
        }
    };
    Ok(ret)
}

fn decode_int(bytes: &[u8], size: &IntSize, signed: bool) -> anyhow::Result<f64> {
    let short = || anyhow::anyhow!("record too short");
    let ret = match (size, signed) {
        (IntSize::U1, true) => i8::from_ne_bytes([*bytes.first().ok_or_else(short)?]) as f64,
        (IntSize::U1, false) => *bytes.first().ok_or_else(short)? as f64,
        (IntSize::U2, true) => {
            i16::from_ne_bytes(bytes.get(..2).ok_or_else(short)?.try_into()?) as f64
        }
        (IntSize::U2, false) => {
            u16::from_ne_bytes(bytes.get(..2).ok_or_else(short)?.try_into()?) as f64
        }
        (IntSize::U4, true) => {
            i32::from_ne_bytes(bytes.get(..4).ok_or_else(short)?.try_into()?) as f64
        }
        (IntSize::U4, false) => {
            u32::from_ne_bytes(bytes.get(..4).ok_or_else(short)?.try_into()?) as f64
        }
        (IntSize::U8, true) => {
            i64::from_ne_bytes(bytes.get(..8).ok_or_else(short)?.try_into()?) as f64
        }
        (IntSize::U8, false) => {
            u64::from_ne_bytes(bytes.get(..8).ok_or_else(short)?.try_into()?) as f64
        }
    };
    Ok(ret)
}

use hdf5::types::FixedAscii;
use hdf5::types::FixedUnicode;
use hdf5::types::TypeDescriptor;
use hdf5::types::VarLenAscii;
use hdf5::types::VarLenUnicode;
use ndarray::{ArrayBase, Data, Dim, RawData};

/// Read strings from `HDF5` dataset
pub fn read_hdf5_strings(data: hdf5::Dataset) -> anyhow::Result<Vec<Box<str>>> {
    let dtype = data.dtype()?;
    let desc = dtype.to_descriptor()?;

    let ret: Vec<Box<str>> = match desc {
        TypeDescriptor::VarLenUnicode => ndarray_into_box_str(&data.read_1d::<VarLenUnicode>()?),
        TypeDescriptor::VarLenAscii => ndarray_into_box_str(&data.read_1d::<VarLenAscii>()?),
        TypeDescriptor::FixedAscii(n) => {
            if n < 24 {
                ndarray_into_box_str(&data.read_1d::<FixedAscii<24>>()?)
            } else if n < 128 {
                ndarray_into_box_str(&data.read_1d::<FixedAscii<128>>()?)
            } else {
                ndarray_into_box_str(&data.read_1d::<FixedAscii<1024>>()?)
            }
        }
        TypeDescriptor::FixedUnicode(n) => {
            if n < 24 {
                ndarray_into_box_str(&data.read_1d::<FixedUnicode<24>>()?)
            } else if n < 128 {
                ndarray_into_box_str(&data.read_1d::<FixedUnicode<128>>()?)
            } else {
                ndarray_into_box_str(&data.read_1d::<FixedUnicode<1024>>()?)
            }
        }
        _ => {
            return Err(anyhow::anyhow!(
                "unsupported string type in {}: {:?}",
                data.name(),
                desc
            ));
        }
    };

    Ok(ret)
}

/// Read a single string stored either as a scalar dataset or as an
/// attribute. Fixed-length strings of any size are read through the
/// raw interface so that long blobs are not truncated.
pub fn read_hdf5_string_scalar(source: ScalarSource) -> anyhow::Result<String> {
    let desc = match &source {
        ScalarSource::Dataset(ds) => ds.dtype()?.to_descriptor()?,
        ScalarSource::Attribute(attr) => attr.dtype()?.to_descriptor()?,
    };

    let ret = match (&source, desc) {
        (ScalarSource::Dataset(ds), TypeDescriptor::VarLenUnicode) => {
            ds.read_scalar::<VarLenUnicode>()?.to_string()
        }
        (ScalarSource::Attribute(attr), TypeDescriptor::VarLenUnicode) => {
            attr.read_scalar::<VarLenUnicode>()?.to_string()
        }
        (ScalarSource::Dataset(ds), TypeDescriptor::VarLenAscii) => {
            ds.read_scalar::<VarLenAscii>()?.to_string()
        }
        (ScalarSource::Attribute(attr), TypeDescriptor::VarLenAscii) => {
            attr.read_scalar::<VarLenAscii>()?.to_string()
        }
        (_, desc @ (TypeDescriptor::FixedAscii(_) | TypeDescriptor::FixedUnicode(_))) => {
            let bytes = crate::compound::read_raw_bytes(&source, &desc)?;
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            String::from_utf8(bytes[..end].to_vec())?
                .trim_end()
                .to_string()
        }
        (_, desc) => {
            return Err(anyhow::anyhow!("not a string scalar: {:?}", desc));
        }
    };

    Ok(ret)
}

/// Where a scalar value lives
pub enum ScalarSource {
    Dataset(hdf5::Dataset),
    Attribute(hdf5::Attribute),
}

/// Convert names into HDF5 variable-length unicode strings
pub fn to_var_len_unicode(names: &[Box<str>]) -> anyhow::Result<Vec<VarLenUnicode>> {
    names
        .iter()
        .map(|x| {
            x.parse::<VarLenUnicode>()
                .map_err(|e| anyhow::anyhow!("invalid name `{}`: {:?}", x, e))
        })
        .collect()
}

fn ndarray_into_box_str<T, U>(data: &ArrayBase<T, Dim<[usize; 1]>>) -> Vec<Box<str>>
where
    T: RawData<Elem = U> + Data,
    U: ToString,
{
    data.into_iter()
        .map(|x| x.to_string().into_boxed_str())
        .collect()
}

use crate::error::ExtractError;
use crate::metadata::RawGeoCoordinate;
use exif::{Exif, In, Reader, Tag, Value};
use image::ImageFormat;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// The parts of an EXIF block the pipeline looks at. Any field may be absent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExifSnapshot {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub latitude: Option<RawGeoCoordinate>,
    pub longitude: Option<RawGeoCoordinate>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Container {
    /// Can embed EXIF and kamadak-exif knows how to find it.
    Exif,
    /// A recognised image that never carries EXIF.
    Plain(ImageFormat),
}

const HEIF_BRANDS: [&[u8; 4]; 9] = [
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"mif1", b"msf1", b"avif",
];

fn sniff_container(header: &[u8]) -> Option<Container> {
    if header.len() >= 12 && &header[4..8] == b"ftyp" {
        let brand = &header[8..12];
        if HEIF_BRANDS.iter().any(|b| &b[..] == brand) {
            return Some(Container::Exif);
        }
    }
    match image::guess_format(header).ok()? {
        ImageFormat::Jpeg | ImageFormat::Tiff | ImageFormat::Png | ImageFormat::WebP => {
            Some(Container::Exif)
        }
        other => Some(Container::Plain(other)),
    }
}

/// Opens `path`, checks it is an image container and reads its EXIF block.
///
/// The file handle is released when this returns.
pub fn read_exif(path: &Path) -> Result<ExifSnapshot, ExtractError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut header = Vec::with_capacity(16);
    (&mut reader).take(16).read_to_end(&mut header)?;
    reader.seek(SeekFrom::Start(0))?;

    match sniff_container(&header) {
        None => {
            return Err(ExtractError::Open(
                "not a recognised image container".to_string(),
            ))
        }
        Some(Container::Plain(format)) => {
            log::debug!("{:?} is a {:?} image, which carries no EXIF", path, format);
            return Err(ExtractError::NoExif);
        }
        Some(Container::Exif) => {}
    }

    let exif = Reader::new().read_from_container(&mut reader)?;
    Ok(snapshot(&exif))
}

fn snapshot(exif: &Exif) -> ExifSnapshot {
    ExifSnapshot {
        width: dimension(exif, Tag::PixelXDimension, Tag::ImageWidth),
        height: dimension(exif, Tag::PixelYDimension, Tag::ImageLength),
        latitude: coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef),
        longitude: coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef),
    }
}

fn dimension(exif: &Exif, tag: Tag, fallback: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)
        .or_else(|| exif.get_field(fallback, In::PRIMARY))
        .and_then(|field| field.value.get_uint(0))
}

fn coordinate(exif: &Exif, tag: Tag, ref_tag: Tag) -> Option<RawGeoCoordinate> {
    let (degrees, minutes, seconds) = dms(&exif.get_field(tag, In::PRIMARY)?.value)?;
    let reference = ascii(&exif.get_field(ref_tag, In::PRIMARY)?.value)?;
    Some(RawGeoCoordinate {
        degrees,
        minutes,
        seconds,
        reference,
    })
}

fn dms(value: &Value) -> Option<(f64, f64, f64)> {
    match value {
        Value::Rational(r) if r.len() >= 3 => Some((r[0].to_f64(), r[1].to_f64(), r[2].to_f64())),
        Value::SRational(r) if r.len() >= 3 => Some((r[0].to_f64(), r[1].to_f64(), r[2].to_f64())),
        _ => None,
    }
}

fn ascii(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(parts) => parts
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use exif::experimental::Writer;
    use exif::{Field, In, Rational, Tag, Value};
    use std::io::Cursor;

    pub struct Gps {
        pub lat: [(u32, u32); 3],
        pub lat_ref: &'static str,
        pub lon: [(u32, u32); 3],
        pub lon_ref: &'static str,
    }

    fn rationals(parts: &[(u32, u32); 3]) -> Value {
        Value::Rational(
            parts
                .iter()
                .map(|&(num, denom)| Rational { num, denom })
                .collect(),
        )
    }

    /// A JPEG made of SOI, an APP1 EXIF segment and EOI. Enough for the EXIF reader.
    pub fn jpeg_with_exif(gps: Option<&Gps>) -> Vec<u8> {
        let mut fields = vec![
            Field {
                tag: Tag::PixelXDimension,
                ifd_num: In::PRIMARY,
                value: Value::Long(vec![4032]),
            },
            Field {
                tag: Tag::PixelYDimension,
                ifd_num: In::PRIMARY,
                value: Value::Long(vec![3024]),
            },
        ];
        if let Some(gps) = gps {
            fields.push(Field {
                tag: Tag::GPSLatitudeRef,
                ifd_num: In::PRIMARY,
                value: Value::Ascii(vec![gps.lat_ref.as_bytes().to_vec()]),
            });
            fields.push(Field {
                tag: Tag::GPSLatitude,
                ifd_num: In::PRIMARY,
                value: rationals(&gps.lat),
            });
            fields.push(Field {
                tag: Tag::GPSLongitudeRef,
                ifd_num: In::PRIMARY,
                value: Value::Ascii(vec![gps.lon_ref.as_bytes().to_vec()]),
            });
            fields.push(Field {
                tag: Tag::GPSLongitude,
                ifd_num: In::PRIMARY,
                value: rationals(&gps.lon),
            });
        }

        let mut writer = Writer::new();
        for field in &fields {
            writer.push_field(field);
        }
        let mut tiff = Cursor::new(Vec::new());
        writer.write(&mut tiff, false).unwrap();
        let tiff = tiff.into_inner();

        let mut jpeg = vec![0xFF, 0xD8];
        let len = (2 + 6 + tiff.len()) as u16;
        jpeg.extend_from_slice(&[0xFF, 0xE1]);
        jpeg.extend_from_slice(&len.to_be_bytes());
        jpeg.extend_from_slice(b"Exif\0\0");
        jpeg.extend_from_slice(&tiff);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    pub fn jpeg_without_exif() -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF, 0xD9]
    }

    pub fn eiffel() -> Gps {
        Gps {
            lat: [(48, 1), (51, 1), (296, 10)],
            lat_ref: "N",
            lon: [(2, 1), (17, 1), (402, 10)],
            lon_ref: "E",
        }
    }
}

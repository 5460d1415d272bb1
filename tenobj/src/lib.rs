//! The three text artifacts produced by the ten-bit assembler.
//!
//! * `.ob` - object image: a header carrying the instruction and data section
//!   sizes, then one line per emitted word.
//! * `.ent` - entry symbols and their final addresses.
//! * `.ext` - every use site of an external symbol.
//!
//! All numbers render in the machine's base-4 letter alphabet (see
//! [`tencpu::base4`](../tencpu/base4/index.html)): five letters per word,
//! four per address, three and two for the object header counters. Fields
//! are tab separated, one record per line.

use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tencpu::{address_to_base4, from_base4, to_base4, word_to_base4, Address, Word};

/// The assembled object image: section sizes plus every encoded word in
/// emission order (instruction words first, then data words).
#[derive(Debug, PartialEq)]
pub struct ObjectImage {
    icf: u16,
    dcf: u16,
    words: Vec<(Address, Word)>,
}

impl ObjectImage {
    pub fn from(icf: u16, dcf: u16, words: Vec<(Address, Word)>) -> ObjectImage {
        ObjectImage { icf, dcf, words }
    }

    /// Size of the instruction section (final IC minus the load origin).
    pub fn icf(&self) -> u16 {
        self.icf
    }

    /// Size of the data section.
    pub fn dcf(&self) -> u16 {
        self.dcf
    }

    pub fn words(&self) -> &[(Address, Word)] {
        &self.words[..]
    }
}

pub fn write_object<W: Write>(writer: &mut W, image: &ObjectImage) -> io::Result<()> {
    writeln!(
        writer,
        "\t{}\t{}",
        to_base4(image.icf, 3),
        to_base4(image.dcf, 2)
    )?;
    for (address, word) in &image.words {
        writeln!(
            writer,
            "{}\t{}",
            address_to_base4(*address),
            word_to_base4(*word)
        )?;
    }
    Ok(())
}

/// Writes a `.ent` or `.ext` record list: symbol name and base-4 address.
pub fn write_symbol_records<W: Write, S: AsRef<str>>(
    writer: &mut W,
    records: &[(S, Address)],
) -> io::Result<()> {
    for (name, address) in records {
        writeln!(writer, "{}\t{}", name.as_ref(), address_to_base4(*address))?;
    }
    Ok(())
}

fn bad_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

/// Parses an object file back into its image. Addresses come back modulo
/// 256, exactly as they were written.
pub fn read_object<R: BufRead>(reader: &mut R) -> io::Result<ObjectImage> {
    let mut lines = reader.lines();

    let header = lines
        .next()
        .ok_or_else(|| bad_data("empty object file".to_owned()))??;
    let mut fields = header.split('\t').skip(1);
    let icf = fields
        .next()
        .and_then(from_base4)
        .ok_or_else(|| bad_data("malformed object header".to_owned()))?;
    let dcf = fields
        .next()
        .and_then(from_base4)
        .ok_or_else(|| bad_data("malformed object header".to_owned()))?;

    let mut words = Vec::with_capacity(usize::from(icf) + usize::from(dcf));
    for line in lines {
        let line = line?;
        let mut fields = line.split('\t');
        let address = fields.next().and_then(from_base4);
        let word = fields.next().and_then(from_base4);
        match (address, word) {
            (Some(address), Some(word)) => words.push((address, word)),
            _ => return Err(bad_data(format!("malformed object line \"{}\"", line))),
        }
    }

    Ok(ObjectImage::from(icf, dcf, words))
}

pub trait ReadObExt: BufRead + Sized {
    fn read_object_image(&mut self) -> io::Result<ObjectImage> {
        read_object(self)
    }
}

impl<R: BufRead + Sized> ReadObExt for R {}

pub trait WriteObExt: Write + Sized {
    fn write_object_image(&mut self, image: &ObjectImage) -> io::Result<()> {
        write_object(self, image)
    }
}

impl<W: Write + Sized> WriteObExt for W {}

pub fn read_object_file<P: AsRef<Path>>(path: P) -> io::Result<ObjectImage> {
    BufReader::new(File::open(path)?).read_object_image()
}

pub fn write_object_file<P: AsRef<Path>>(path: P, image: &ObjectImage) -> io::Result<()> {
    BufWriter::new(File::create(path)?).write_object_image(image)
}

pub fn write_records_file<P: AsRef<Path>, S: AsRef<str>>(
    path: P,
    records: &[(S, Address)],
) -> io::Result<()> {
    write_symbol_records(&mut BufWriter::new(File::create(path)?), records)
}

#[cfg(test)]
mod test;

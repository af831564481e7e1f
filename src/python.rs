//! Python bindings for the k0s_decay disassembler

use clap::ValueEnum;
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::decoder::CatalogDecoder;
use crate::format::OutputFormat;
use crate::image::Image;
use crate::program::Program;
use crate::strategy::Strategy;
use crate::{Address, DisassemblyError};

fn run(
    image: Image,
    strategy: Strategy,
    output_format: OutputFormat,
    entries: Option<Vec<Address>>,
) -> Result<String, DisassemblyError> {
    let decoder = CatalogDecoder::new();
    let mut program = Program::new(image);
    match entries {
        Some(entries) => strategy.run_from(&mut program, &decoder, &entries)?,
        None => strategy.run(&mut program, &decoder)?,
    }
    output_format.get_formatter().format(&program)
}

/// Disassemble a raw flash image with specified strategy and output format
#[pyfunction]
#[pyo3(signature = (
    binary_data,
    strategy="recursive",
    output_format="text",
    entries=None
))]
fn disassemble(
    py: Python<'_>,
    binary_data: Vec<u8>,
    strategy: &str,
    output_format: &str,
    entries: Option<Vec<Address>>,
) -> PyResult<String> {
    let strategy = Strategy::from_str(strategy, true)
        .map_err(|_| PyValueError::new_err(format!("Unknown strategy: {}", strategy)))?;
    let output_format: OutputFormat = output_format
        .parse()
        .map_err(PyValueError::new_err)?;

    let image = Image::new(binary_data);
    py.allow_threads(|| run(image, strategy, output_format, entries))
        .map_err(|e| PyValueError::new_err(format!("Disassembly failed: {}", e)))
}

/// Disassemble a flash image file with specified strategy and output format
#[pyfunction]
#[pyo3(signature = (
    file_path,
    strategy="recursive",
    output_format="text",
    entries=None
))]
fn disassemble_file(
    py: Python<'_>,
    file_path: &str,
    strategy: &str,
    output_format: &str,
    entries: Option<Vec<Address>>,
) -> PyResult<String> {
    let bytes = std::fs::read(file_path)
        .map_err(|e| PyIOError::new_err(format!("Failed to read file {}: {}", file_path, e)))?;

    log::debug!("Disassembling file: {}", file_path);
    disassemble(py, bytes, strategy, output_format, entries)
}

/// Python module initialization
#[pymodule]
fn k0s_decay(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(disassemble, m)?)?;
    m.add_function(wrap_pyfunction!(disassemble_file, m)?)?;

    // Create the OutputFormat class as a dict
    let py = m.py();
    let output_format = PyDict::new(py);
    output_format.set_item("TEXT", "text")?;
    output_format.set_item("JSON", "json")?;
    output_format.set_item("JSONL", "jsonl")?;
    output_format.set_item("CSV", "csv")?;
    m.setattr("OutputFormat", output_format)?;

    // Create the Strategy class as a dict
    let strategy = PyDict::new(py);
    strategy.set_item("RECURSIVE", "recursive")?;
    strategy.set_item("LINEAR", "linear")?;
    m.setattr("Strategy", strategy)?;

    Ok(())
}

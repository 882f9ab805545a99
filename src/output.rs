// src/output.rs
use crate::grid::Grid;
use ndarray::{ArrayBase, Axis, Data, IxDyn};
use num_complex::Complex64;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Writes `|ψ_c|²` of the first trajectory, one row per grid point
///
/// Columns are the point coordinates followed by one density per component.
pub fn write_density_to_csv<S>(
    filename: &str,
    grid: &Grid,
    field: &ArrayBase<S, IxDyn>,
) -> io::Result<()>
where
    S: Data<Elem = Complex64>,
{
    if field.ndim() != grid.dims() + 2 || field.shape()[2..] != *grid.shape() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "field shape {:?} does not fit grid {:?}",
                field.shape(),
                grid.shape()
            ),
        ));
    }
    if field.shape()[0] == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "field holds no trajectories",
        ));
    }

    let first = field.index_axis(Axis(0), 0);
    let components = first.shape()[0];
    let coordinates: Vec<_> = (0..grid.dims()).map(|axis| grid.coordinates(axis)).collect();

    let mut file = BufWriter::new(File::create(filename)?);
    let header: Vec<String> = (0..grid.dims())
        .map(|axis| format!("x{}", axis))
        .chain((0..components).map(|c| format!("density_{}", c)))
        .collect();
    writeln!(file, "{}", header.join(","))?;

    let mut idx = vec![0; grid.dims()];
    for flat in 0..grid.size() {
        grid.unravel(flat, &mut idx);
        let mut row: Vec<String> = idx
            .iter()
            .enumerate()
            .map(|(axis, &i)| coordinates[axis][i].to_string())
            .collect();
        for c in 0..components {
            let component = first.index_axis(Axis(0), c);
            row.push(component[idx.as_slice()].norm_sqr().to_string());
        }
        writeln!(file, "{}", row.join(","))?;
    }
    file.flush()
}

pub fn write_summary_to_csv(filename: &str, summary_data: &[(&str, &str)]) -> io::Result<()> {
    let mut file = File::create(filename)?;
    for (key, value) in summary_data {
        writeln!(file, "{},{}", key, value)?;
    }
    Ok(())
}

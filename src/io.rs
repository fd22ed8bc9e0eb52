use crate::{KMeansError, Result, memory::*};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::path::Path;

/// Name of the result file written for a run over **point_cnt** points.
pub fn results_file_name(point_cnt: usize) -> String {
    format!("{}_results.csv", point_cnt)
}

/// Name of the input file the sweep reads for **point_cnt** points.
pub fn data_file_name(point_cnt: usize) -> String {
    format!("{}_data.csv", point_cnt)
}

fn parse_field<T: Primitive>(record: &StringRecord, idx: usize, line: u64) -> Result<T> {
    let field = record.get(idx).ok_or_else(|| KMeansError::Parse {
        line,
        reason: format!("expected 2 fields, found {}", record.len()),
    })?;
    let value: T = field.parse().map_err(|err| KMeansError::Parse {
        line,
        reason: format!("{:?}: {}", field, err),
    })?;
    if !value.is_finite() {
        return Err(KMeansError::Parse { line, reason: format!("{:?} is not a finite number", field) });
    }
    Ok(value)
}

/// Load `x,y` records (no header) into a fresh [`PointStore`] of unassigned points.
/// Fields after the second one are ignored.
pub fn read_points<T: Primitive, P: AsRef<Path>>(path: P) -> Result<PointStore<T>> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| KMeansError::Input { path: path.to_path_buf(), source })?;

    let mut points = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) if err.is_io_error() => return Err(KMeansError::Input { path: path.to_path_buf(), source: err }),
            Err(err) => {
                let line = err.position().map(|pos| pos.line()).unwrap_or(idx as u64 + 1);
                return Err(KMeansError::Parse { line, reason: err.to_string() });
            }
        };
        let line = record.position().map(|pos| pos.line()).unwrap_or(idx as u64 + 1);
        let x = parse_field(&record, 0, line)?;
        let y = parse_field(&record, 1, line)?;
        points.push(Point::new(x, y));
    }
    log::debug!("Read {} points from {}", points.len(), path.display());
    Ok(PointStore::new(points))
}

/// Write one `x,y,cluster` line per point, in store order, below a header line.
/// Points that were never assigned are written with cluster `-1`.
pub fn write_results<T: Primitive, P: AsRef<Path>>(path: P, points: &PointStore<T>) -> Result<()> {
    let path = path.as_ref();
    let output_err = |source: csv::Error| KMeansError::Output { path: path.to_path_buf(), source };

    let mut wtr = WriterBuilder::new().from_path(path).map_err(output_err)?;
    wtr.write_record(["x", "y", "cluster"]).map_err(output_err)?;
    for p in points.iter() {
        let cluster = match p.cluster {
            Some(c) => c.to_string(),
            None => "-1".to_string(),
        };
        wtr.write_record([p.x.to_string(), p.y.to_string(), cluster]).map_err(output_err)?;
    }
    wtr.flush().map_err(|err| output_err(err.into()))?;
    log::debug!("Wrote {} results to {}", points.len(), path.display());
    Ok(())
}

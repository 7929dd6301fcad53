use crate::common_io::{mkdir, open_buf_writer};
use crate::parquet::{add_label_column, add_value_column, ParquetWriter};

use nalgebra::DMatrix;
use parquet::data_type::ByteArray;

/// Dense matrix with labeled axes, ready for export.
///
/// Each row carries `index_names.len()` label parts (for example a
/// feature tag value plus `start` and `end` of a bin); columns are
/// single labels. `write` dispatches on the output extension:
/// `.parquet` for parquet, anything else for CSV, gzipped when the
/// name ends with `.gz`.
pub struct LabeledMatrix {
    pub index_names: Vec<Box<str>>,
    pub row_labels: Vec<Vec<Box<str>>>,
    pub column_labels: Vec<Box<str>>,
    pub values: DMatrix<f64>,
}

impl LabeledMatrix {
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Write to `file_path`; `with_names = false` drops the row-label
    /// header names and keeps only positional placeholders
    pub fn write(&self, file_path: &str, with_names: bool) -> anyhow::Result<()> {
        mkdir(file_path)?;
        if file_path.ends_with(".parquet") {
            self.write_parquet(file_path, with_names)
        } else {
            self.write_csv(file_path, with_names)
        }
    }

    pub fn write_csv(&self, file_path: &str, with_names: bool) -> anyhow::Result<()> {
        self.check_shape()?;

        let mut writer = csv::Writer::from_writer(open_buf_writer(file_path)?);

        let mut header: Vec<&str> = Vec::with_capacity(self.index_names.len() + self.ncols());
        for name in self.index_names.iter() {
            header.push(if with_names { name.as_ref() } else { "" });
        }
        header.extend(self.column_labels.iter().map(|x| x.as_ref()));
        writer.write_record(&header)?;

        for (parts, row) in self.row_labels.iter().zip(self.values.row_iter()) {
            let mut record: Vec<String> =
                parts.iter().map(|x| x.as_ref().to_string()).collect();
            record.extend(row.iter().map(|x| format!("{}", x)));
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn write_parquet(&self, file_path: &str, with_names: bool) -> anyhow::Result<()> {
        self.check_shape()?;

        let label_names: Vec<Box<str>> = if with_names {
            self.index_names.to_vec()
        } else {
            (0..self.index_names.len())
                .map(|k| format!("_{}", k).into_boxed_str())
                .collect()
        };

        let writer = ParquetWriter::new(file_path, &label_names, &self.column_labels)?;
        let mut file_writer = writer.open()?;
        let mut row_group = file_writer.next_row_group()?;

        for k in 0..self.index_names.len() {
            let labels: Vec<ByteArray> = self
                .row_labels
                .iter()
                .map(|parts| ByteArray::from(parts[k].as_ref()))
                .collect();
            add_label_column(&mut row_group, &labels)?;
        }

        for j in 0..self.ncols() {
            let column: Vec<f64> = self.values.column(j).iter().copied().collect();
            add_value_column(&mut row_group, &column)?;
        }

        row_group.close()?;
        file_writer.close()?;
        Ok(())
    }

    fn check_shape(&self) -> anyhow::Result<()> {
        if self.row_labels.len() != self.nrows() {
            return Err(anyhow::anyhow!(
                "{} row labels for {} rows",
                self.row_labels.len(),
                self.nrows()
            ));
        }
        if self.column_labels.len() != self.ncols() {
            return Err(anyhow::anyhow!(
                "{} column labels for {} columns",
                self.column_labels.len(),
                self.ncols()
            ));
        }
        if let Some(parts) = self
            .row_labels
            .iter()
            .find(|parts| parts.len() != self.index_names.len())
        {
            return Err(anyhow::anyhow!(
                "row label arity {} does not match {} index names",
                parts.len(),
                self.index_names.len()
            ));
        }
        Ok(())
    }
}

use parquet::basic::Type as ParquetType;
use parquet::basic::{Compression, ConvertedType, Repetition, ZstdLevel};
use parquet::data_type::{ByteArray, ByteArrayType, DoubleType};
use parquet::file::properties::WriterProperties;
use parquet::file::writer::{SerializedFileWriter, SerializedRowGroupWriter};
use parquet::schema::types::Type;
use std::fs::File;
use std::sync::Arc;

/// Parquet writer for a labeled matrix: a block of UTF-8 label columns
/// followed by a block of `DOUBLE` value columns, one row group.
pub struct ParquetWriter {
    file: File,
    schema: Arc<Type>,
    writer_properties: Arc<WriterProperties>,
}

impl ParquetWriter {
    ///
    /// * `file_path`: output file path
    ///
    /// * `label_columns`: names of the leading row-label columns
    ///
    /// * `value_columns`: names of the numeric columns
    ///
    pub fn new(
        file_path: &str,
        label_columns: &[Box<str>],
        value_columns: &[Box<str>],
    ) -> anyhow::Result<Self> {
        let schema = build_columns_schema(label_columns, value_columns)?;

        let file = File::create(file_path)?;

        let zstd_level = ZstdLevel::try_new(5)?;
        let writer_properties = Arc::new(
            WriterProperties::builder()
                .set_compression(Compression::ZSTD(zstd_level))
                .build(),
        );

        Ok(Self {
            file,
            schema,
            writer_properties,
        })
    }

    pub fn open(&self) -> anyhow::Result<SerializedFileWriter<File>> {
        Ok(SerializedFileWriter::new(
            self.file.try_clone()?,
            self.schema.clone(),
            self.writer_properties.clone(),
        )?)
    }
}

/// Append one UTF-8 label column to an open row group
pub fn add_label_column(
    row_group: &mut SerializedRowGroupWriter<File>,
    labels: &[ByteArray],
) -> anyhow::Result<()> {
    if let Some(mut column) = row_group.next_column()? {
        column
            .typed::<ByteArrayType>()
            .write_batch(labels, None, None)?;
        column.close()?;
    }
    Ok(())
}

/// Append one `f64` value column to an open row group
pub fn add_value_column(
    row_group: &mut SerializedRowGroupWriter<File>,
    values: &[f64],
) -> anyhow::Result<()> {
    if let Some(mut column) = row_group.next_column()? {
        column
            .typed::<DoubleType>()
            .write_batch(values, None, None)?;
        column.close()?;
    }
    Ok(())
}

fn build_columns_schema(
    label_columns: &[Box<str>],
    value_columns: &[Box<str>],
) -> anyhow::Result<Arc<Type>> {
    let mut fields = Vec::with_capacity(label_columns.len() + value_columns.len());

    for name in label_columns {
        fields.push(Arc::new(
            Type::primitive_type_builder(name, ParquetType::BYTE_ARRAY)
                .with_repetition(Repetition::REQUIRED)
                .with_converted_type(ConvertedType::UTF8)
                .build()?,
        ));
    }

    for name in value_columns {
        fields.push(Arc::new(
            Type::primitive_type_builder(name, ParquetType::DOUBLE)
                .with_repetition(Repetition::REQUIRED)
                .build()?,
        ));
    }

    let schema = Arc::new(
        Type::group_type_builder("count_table")
            .with_fields(fields)
            .build()?,
    );

    Ok(schema)
}

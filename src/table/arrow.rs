// src/table/arrow.rs

use arrow::array::{ArrayRef, Int64Array, StringArray, StringBuilder, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use super::{OutputTable, RollTable};
use crate::error::Result;

impl RollTable {
    /// Columns: JUR, ROLL_NUM, IMPR_VALUE, LAND_VALUE.
    pub fn arrow_schema() -> Arc<ArrowSchema> {
        Arc::new(ArrowSchema::new(vec![
            Field::new("JUR", DataType::UInt32, false),
            Field::new("ROLL_NUM", DataType::Utf8, false),
            Field::new("IMPR_VALUE", DataType::Int64, true),
            Field::new("LAND_VALUE", DataType::Int64, true),
        ]))
    }

    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let records = self.records();
        let cols: Vec<ArrayRef> = vec![
            Arc::new(UInt32Array::from_iter_values(records.iter().map(|r| r.jur))),
            Arc::new(StringArray::from_iter_values(
                records.iter().map(|r| r.roll_num.as_str()),
            )),
            Arc::new(Int64Array::from(
                records.iter().map(|r| r.impr_value).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                records.iter().map(|r| r.land_value).collect::<Vec<_>>(),
            )),
        ];
        Ok(RecordBatch::try_new(Self::arrow_schema(), cols)?)
    }
}

impl OutputTable {
    /// `jur` is UInt32, `roll` and every scraped field are nullable Utf8.
    pub fn arrow_schema(&self) -> Arc<ArrowSchema> {
        let mut fields = Vec::with_capacity(self.field_columns().len() + 2);
        fields.push(Field::new("jur", DataType::UInt32, false));
        fields.push(Field::new("roll", DataType::Utf8, false));
        for name in self.field_columns() {
            fields.push(Field::new(name, DataType::Utf8, true));
        }
        Arc::new(ArrowSchema::new(fields))
    }

    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let rows = self.rows();
        let mut cols: Vec<ArrayRef> = Vec::with_capacity(self.field_columns().len() + 2);
        cols.push(Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.jur))));
        cols.push(Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.roll.as_str()),
        )));

        for name in self.field_columns() {
            let mut b = StringBuilder::new();
            for row in rows {
                b.append_option(row.fields.get(name).flatten());
            }
            cols.push(Arc::new(b.finish()) as ArrayRef);
        }

        Ok(RecordBatch::try_new(self.arrow_schema(), cols)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{PropertyRow, RollRecord, ScrapedFields};
    use arrow::array::Array;

    #[test]
    fn output_batch_fills_missing_cells_with_null() {
        let mut first = ScrapedFields::default();
        first.insert("lblA", Some("100".into()));
        let mut second = ScrapedFields::default();
        second.insert("lblB", Some("x".into()));

        let mut table = OutputTable::new();
        table.push(PropertyRow { jur: 226, roll: "1".into(), fields: first });
        table.push(PropertyRow { jur: 226, roll: "2".into(), fields: second });

        let batch = table.to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 4);

        let a = batch.column(2).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(a.value(0), "100");
        assert!(a.is_null(1));
        let b = batch.column(3).as_any().downcast_ref::<StringArray>().unwrap();
        assert!(b.is_null(0));
        assert_eq!(b.value(1), "x");
    }

    #[test]
    fn roll_batch_keeps_nullable_values() {
        let table = RollTable::new(vec![RollRecord {
            jur: 226,
            roll_num: "0001".into(),
            impr_value: None,
            land_value: Some(52_000),
        }]);
        let batch = table.to_record_batch().unwrap();
        let impr = batch.column(2).as_any().downcast_ref::<Int64Array>().unwrap();
        let land = batch.column(3).as_any().downcast_ref::<Int64Array>().unwrap();
        assert!(impr.is_null(0));
        assert_eq!(land.value(0), 52_000);
    }

    #[test]
    fn empty_output_table_still_has_key_columns() {
        let batch = OutputTable::new().to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.schema().field(0).name(), "jur");
        assert_eq!(batch.schema().field(1).name(), "roll");
    }
}

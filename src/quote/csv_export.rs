// ==========================================
// 3D打印成本报价系统 - 历史导出 (CSV)
// ==========================================
// 职责: 把模型的报价历史写成 CSV; 数字取自存储的结果快照, 绝不重算
// ==========================================

use std::io::Write;

use anyhow::Context;

use crate::domain::piece::{Piece, QuoteVersion};
use crate::i18n::t;

/// 将模型的报价历史写入 CSV
///
/// # 参数
/// - writer: 输出目标
/// - piece: 所属模型
/// - versions: 版本列表 (按调用方给定的顺序写出)
///
/// # 返回
/// - Ok(usize): 写出的数据行数 (不含表头)
pub fn write_history_csv<W: Write>(
    writer: W,
    piece: &Piece,
    versions: &[QuoteVersion],
) -> anyhow::Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    // 表头
    csv_writer
        .write_record([
            t("quote.piece"),
            t("export.history_header_version"),
            t("export.history_header_date"),
            t("export.history_header_note"),
            t("export.history_header_total"),
            t("export.history_header_marketplace"),
        ])
        .context("写入CSV表头失败")?;

    let mut rows = 0usize;
    for version in versions {
        // 平台售价来自结果快照; 快照损坏时该列留空, 不中断导出
        let marketplace_price = match version.result() {
            Ok(result) => format!("{:.2}", result.marketplace_price),
            Err(e) => {
                tracing::warn!(
                    version_id = %version.version_id,
                    "结果快照解析失败, 平台售价列留空: {}",
                    e
                );
                String::new()
            }
        };

        csv_writer
            .write_record([
                piece.piece_name.clone(),
                format!("V{}", version.version_no),
                version.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                version.note.clone().unwrap_or_default(),
                format!("{:.2}", version.total_price),
                marketplace_price,
            ])
            .context("写入CSV数据行失败")?;
        rows += 1;
    }

    csv_writer.flush().context("CSV落盘失败")?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::PricingInputs;
    use crate::engine::compute_price;

    fn sample_piece() -> Piece {
        Piece {
            piece_id: "P001".to_string(),
            piece_name: "测试模型".to_string(),
            description: None,
            created_by: "tester".to_string(),
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
            revision: 1,
        }
    }

    fn sample_version(no: i32) -> QuoteVersion {
        let inputs = PricingInputs {
            filament_grams: 50.0,
            material_price_per_kg: 20000.0,
            ..Default::default()
        };
        let result = compute_price(&inputs);
        QuoteVersion {
            version_id: format!("V{:03}", no),
            piece_id: "P001".to_string(),
            version_no: no,
            inputs_json: serde_json::to_string(&inputs).unwrap(),
            result_json: serde_json::to_string(&result).unwrap(),
            total_price: result.total_price,
            note: Some("备注".to_string()),
            created_by: Some("tester".to_string()),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_write_history_csv_row_count() {
        let piece = sample_piece();
        let versions = vec![sample_version(2), sample_version(1)];

        let mut buf = Vec::new();
        let rows = write_history_csv(&mut buf, &piece, &versions).unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(buf).unwrap();
        // 表头 + 2行数据
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("测试模型"));
        assert!(text.contains("V2"));
        assert!(text.contains("1000.00"));
    }

    #[test]
    fn test_write_history_csv_empty_history() {
        let piece = sample_piece();

        let mut buf = Vec::new();
        let rows = write_history_csv(&mut buf, &piece, &[]).unwrap();
        assert_eq!(rows, 0);

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1); // 仅表头
    }
}

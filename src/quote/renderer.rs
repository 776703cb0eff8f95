// ==========================================
// 3D打印成本报价系统 - 报价单渲染
// ==========================================
// 职责: 把 (输入, 结果) 渲染为独立的纯文本报价单
// 红线: 只格式化, 不重算; 展示比率的除法必须带 epsilon 保护
// ==========================================

use chrono::NaiveDateTime;

use crate::domain::pricing::{PricingInputs, PricingResult};
use crate::i18n::t;

/// 展示比率的除零保护阈值
const DISPLAY_EPSILON: f64 = 1e-9;

/// 货币格式化（保留2位小数, 仅用于展示）
pub fn format_currency(value: f64, symbol: &str) -> String {
    format!("{}{:.2}", symbol, value)
}

/// 展示比率 (分母接近零时返回0, 避免 NaN/无穷进入展示层)
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < DISPLAY_EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}

// ==========================================
// QuoteRenderer - 报价单渲染器
// ==========================================
pub struct QuoteRenderer {
    currency_symbol: String,
}

impl QuoteRenderer {
    /// 构造函数
    ///
    /// # 参数
    /// - currency_symbol: 货币符号 (来自配置)
    pub fn new(currency_symbol: String) -> Self {
        Self { currency_symbol }
    }

    /// 渲染纯文本报价单
    ///
    /// # 参数
    /// - piece_name: 模型名称
    /// - version_no: 版本号 (None 表示未保存的即时报价)
    /// - created_at: 报价时间
    /// - inputs: 定价输入
    /// - result: 定价结果 (原样展示, 不重算)
    pub fn render(
        &self,
        piece_name: &str,
        version_no: Option<i32>,
        created_at: NaiveDateTime,
        inputs: &PricingInputs,
        result: &PricingResult,
    ) -> String {
        let sym = &self.currency_symbol;
        let mut lines: Vec<String> = Vec::new();

        lines.push("==========================================".to_string());
        lines.push(t("quote.title"));
        lines.push("==========================================".to_string());
        lines.push(format!("{}: {}", t("quote.piece"), piece_name));
        if let Some(no) = version_no {
            lines.push(format!("{}: V{}", t("quote.version"), no));
        }
        lines.push(format!(
            "{}: {}",
            t("quote.date"),
            created_at.format("%Y-%m-%d %H:%M:%S")
        ));
        lines.push(String::new());

        // 参数段
        lines.push(format!("---- {} ----", t("quote.section_inputs")));
        lines.push(format!(
            "{}: {:.2} {}",
            t("quote.print_time"),
            inputs.total_hours(),
            t("quote.hours_unit")
        ));
        lines.push(format!(
            "{}: {:.1} {}",
            t("quote.filament"),
            inputs.filament_grams,
            t("quote.grams_unit")
        ));
        lines.push(String::new());

        // 成本明细段
        lines.push(format!("---- {} ----", t("quote.section_costs")));
        lines.push(format!(
            "{}: {}",
            t("quote.material_cost"),
            format_currency(result.material_cost, sym)
        ));
        lines.push(format!(
            "{}: {}",
            t("quote.energy_cost"),
            format_currency(result.energy_cost, sym)
        ));
        lines.push(format!(
            "{}: {}",
            t("quote.wear_cost"),
            format_currency(result.wear_cost, sym)
        ));
        lines.push(format!(
            "{}: {}",
            t("quote.base_before_margin"),
            format_currency(result.base_before_margin, sym)
        ));
        lines.push(format!(
            "{} ({:.0}%): {}",
            t("quote.error_margin"),
            inputs.error_margin_percent,
            format_currency(result.error_margin_amount, sym)
        ));
        lines.push(format!(
            "{}: {}",
            t("quote.subtotal_before_multiplier"),
            format_currency(result.subtotal_before_multiplier, sym)
        ));
        lines.push(format!(
            "{}: {}",
            t("quote.supplies_cost"),
            format_currency(result.supplies_cost, sym)
        ));
        lines.push(String::new());

        // 单位成本 (展示比率, 除法带保护)
        lines.push(format!(
            "{}: {}",
            t("quote.cost_per_gram"),
            format_currency(safe_ratio(result.total_price, inputs.filament_grams), sym)
        ));
        lines.push(format!(
            "{}: {}",
            t("quote.cost_per_hour"),
            format_currency(safe_ratio(result.total_price, inputs.total_hours()), sym)
        ));
        lines.push(String::new());

        // 最终价格
        lines.push(format!(
            "{}: {}",
            t("quote.total_price"),
            format_currency(result.total_price, sym)
        ));
        lines.push(format!(
            "{}: {}",
            t("quote.marketplace_price"),
            format_currency(result.marketplace_price, sym)
        ));
        lines.push(String::new());
        lines.push(t("quote.footer"));

        lines.join("\n")
    }
}

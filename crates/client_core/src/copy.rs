//! User-visible strings, one table per locale.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "en")]
    En,
}

impl Locale {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "zh-cn" | "zh" | "zh_cn" => Some(Locale::ZhCn),
            "en" | "en-us" | "en_us" => Some(Locale::En),
            _ => None,
        }
    }

    pub fn copy(self) -> &'static UiCopy {
        match self {
            Locale::ZhCn => &ZH_CN,
            Locale::En => &EN,
        }
    }
}

#[derive(Debug)]
pub struct UiCopy {
    pub locale: Locale,

    pub unknown: &'static str,
    pub none: &'static str,
    pub list_separator: &'static str,
    pub suggestion_separator: &'static str,

    pub label_input_text: &'static str,
    pub label_main_category: &'static str,
    pub label_sub_categories: &'static str,
    pub label_confidence: &'static str,
    pub label_text: &'static str,
    pub label_time: &'static str,
    pub label_loading: &'static str,
    pub history_empty: &'static str,

    pub classify_empty_text: &'static str,
    pub classify_done: &'static str,
    pub classify_failed: &'static str,
    pub history_load_failed: &'static str,

    pub annotation_incomplete: &'static str,
    pub annotation_done: &'static str,
    pub annotation_failed: &'static str,
    pub annotations_load_failed: &'static str,
    pub annotation_stats_daily: &'static str,
    pub annotation_stats_annotators: &'static str,
    pub annotation_stats_empty: &'static str,
    pub annotation_stats_failed: &'static str,
    pub select_main_category: &'static str,

    pub suggestion_empty_text: &'static str,
    pub suggestion_too_short: &'static str,
    pub suggestion_loading: &'static str,
    pub suggestion_done: &'static str,
    pub suggestion_failed: &'static str,
    pub suggestion_category: &'static str,
    pub suggestion_sub_categories: &'static str,
    pub suggestion_explanation: &'static str,
    pub suggestion_model_prediction: &'static str,
    pub suggestion_prediction_category: &'static str,
    pub suggestion_prediction_sub_categories: &'static str,
    pub suggestion_prediction_confidence: &'static str,

    pub training_preparing: &'static str,
    pub training_in_progress: &'static str,
    pub training_started: &'static str,
    pub training_complete: &'static str,
    pub training_default_success: &'static str,
    pub training_failed_prefix: &'static str,
    pub training_failed_notice: &'static str,
    pub server_response_error: &'static str,
    pub training_data_count: &'static str,
    pub training_elapsed: &'static str,
    pub training_seconds: &'static str,
    pub training_distribution: &'static str,
    pub training_overview_failed: &'static str,

    pub import_incomplete: &'static str,
    pub import_default_success: &'static str,
    pub import_failed: &'static str,
    pub export_failed: &'static str,
    pub evaluate_accuracy: &'static str,
    pub evaluate_true_category: &'static str,
    pub evaluate_predicted_category: &'static str,
    pub evaluate_done: &'static str,
    pub evaluate_failed: &'static str,

    pub tab_classify: &'static str,
    pub tab_annotate: &'static str,
    pub tab_training: &'static str,
}

pub static ZH_CN: UiCopy = UiCopy {
    locale: Locale::ZhCn,

    unknown: "未知",
    none: "无",
    list_separator: ", ",
    suggestion_separator: "、",

    label_input_text: "输入文本：",
    label_main_category: "主类别：",
    label_sub_categories: "子类别：",
    label_confidence: "置信度：",
    label_text: "文本:",
    label_time: "时间:",
    label_loading: "分类中...",
    history_empty: "暂无历史记录",

    classify_empty_text: "请输入文本",
    classify_done: "分类完成",
    classify_failed: "分类过程中发生错误",
    history_load_failed: "加载历史记录失败",

    annotation_incomplete: "请填写完整的标注信息",
    annotation_done: "标注成功",
    annotation_failed: "标注失败，请重试",
    annotations_load_failed: "加载标注数据失败",
    annotation_stats_daily: "每日标注量：",
    annotation_stats_annotators: "标注者统计：",
    annotation_stats_empty: "暂无标注统计",
    annotation_stats_failed: "加载标注统计失败",
    select_main_category: "请选择主类别",

    suggestion_empty_text: "请先输入文本",
    suggestion_too_short: "文本长度需要大于5个字符",
    suggestion_loading: "正在获取AI建议...",
    suggestion_done: "AI建议获取成功",
    suggestion_failed: "获取AI建议失败",
    suggestion_category: "AI建议主类别：",
    suggestion_sub_categories: "AI建议子类别：",
    suggestion_explanation: "分析理由：",
    suggestion_model_prediction: "模型预测：",
    suggestion_prediction_category: "主类别：",
    suggestion_prediction_sub_categories: "子类别：",
    suggestion_prediction_confidence: "置信度：",

    training_preparing: "正在准备训练数据...",
    training_in_progress: "模型训练中...",
    training_started: "模型重训练开始...",
    training_complete: "训练完成！",
    training_default_success: "模型重训练完成",
    training_failed_prefix: "训练失败: ",
    training_failed_notice: "模型重训练失败，请重试",
    server_response_error: "服务器响应错误",
    training_data_count: "训练数据量：",
    training_elapsed: "训练耗时：",
    training_seconds: "秒",
    training_distribution: "类别分布：",
    training_overview_failed: "加载训练数据统计失败",

    import_incomplete: "导入数据不完整",
    import_default_success: "导入成功",
    import_failed: "导入标注数据失败",
    export_failed: "导出标注数据失败",
    evaluate_accuracy: "准确率：",
    evaluate_true_category: "真实类别",
    evaluate_predicted_category: "预测类别",
    evaluate_done: "模型评估完成",
    evaluate_failed: "模型评估失败",

    tab_classify: "文本分类",
    tab_annotate: "数据标注",
    tab_training: "模型训练",
};

pub static EN: UiCopy = UiCopy {
    locale: Locale::En,

    unknown: "unknown",
    none: "none",
    list_separator: ", ",
    suggestion_separator: ", ",

    label_input_text: "Input text:",
    label_main_category: "Main category:",
    label_sub_categories: "Sub-categories:",
    label_confidence: "Confidence:",
    label_text: "Text:",
    label_time: "Time:",
    label_loading: "Classifying...",
    history_empty: "no history",

    classify_empty_text: "please enter text",
    classify_done: "classification complete",
    classify_failed: "an error occurred during classification",
    history_load_failed: "failed to load history",

    annotation_incomplete: "please complete the annotation",
    annotation_done: "annotation saved",
    annotation_failed: "annotation failed, please retry",
    annotations_load_failed: "failed to load annotations",
    annotation_stats_daily: "Annotations per day:",
    annotation_stats_annotators: "Annotations per annotator:",
    annotation_stats_empty: "no annotation statistics",
    annotation_stats_failed: "failed to load annotation statistics",
    select_main_category: "select a main category",

    suggestion_empty_text: "please enter text first",
    suggestion_too_short: "text must be longer than 5 characters",
    suggestion_loading: "requesting AI suggestion...",
    suggestion_done: "AI suggestion received",
    suggestion_failed: "failed to get AI suggestion",
    suggestion_category: "Suggested main category:",
    suggestion_sub_categories: "Suggested sub-categories:",
    suggestion_explanation: "Explanation:",
    suggestion_model_prediction: "Model prediction:",
    suggestion_prediction_category: "Main category: ",
    suggestion_prediction_sub_categories: "Sub-categories: ",
    suggestion_prediction_confidence: "Confidence: ",

    training_preparing: "preparing training data",
    training_in_progress: "training in progress",
    training_started: "model retraining started",
    training_complete: "training complete",
    training_default_success: "model retraining complete",
    training_failed_prefix: "training failed: ",
    training_failed_notice: "model retraining failed, please retry",
    server_response_error: "server response error",
    training_data_count: "Training records:",
    training_elapsed: "Elapsed:",
    training_seconds: "s",
    training_distribution: "Category distribution:",
    training_overview_failed: "failed to load training data statistics",

    import_incomplete: "import data is incomplete",
    import_default_success: "import complete",
    import_failed: "failed to import annotations",
    export_failed: "failed to export annotations",
    evaluate_accuracy: "Accuracy:",
    evaluate_true_category: "True category",
    evaluate_predicted_category: "Predicted category",
    evaluate_done: "model evaluation complete",
    evaluate_failed: "model evaluation failed",

    tab_classify: "Classify",
    tab_annotate: "Annotate",
    tab_training: "Training",
};

impl UiCopy {
    /// Mirrors the browser's `toLocaleString()` output for each locale.
    pub fn format_timestamp(&self, timestamp: &NaiveDateTime) -> String {
        match self.locale {
            Locale::ZhCn => timestamp.format("%Y/%-m/%-d %H:%M:%S").to_string(),
            Locale::En => timestamp.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        }
    }

    pub fn format_percent(&self, ratio: f64) -> String {
        let ratio = if ratio.is_finite() { ratio } else { 0.0 };
        format!("{:.2}%", ratio * 100.0)
    }
}

use crate::model::Record;
use crate::utils::DATE_FORMAT;

use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

/// Summary of one run's new records, rendered per channel.
#[derive(Debug, Clone)]
pub struct Digest {
    pub run_date: NaiveDate,
    pub site_name: String,
    pub site_url: String,
    pub repo_url: Option<String>,
    pub include_keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
    pub records: Vec<Record>,
}

impl Digest {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn subject(&self) -> String {
        format!(
            "【{}】发现 {} 条新招聘 ({})",
            self.site_name,
            self.records.len(),
            self.run_date.format(DATE_FORMAT)
        )
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "日期: {}", self.run_date.format(DATE_FORMAT));
        let _ = writeln!(out, "关键词: {}", join_keywords(&self.include_keywords));
        let _ = writeln!(out, "排除关键词: {}", join_keywords(&self.exclude_keywords));
        let _ = writeln!(out);
        let _ = writeln!(out, "发现以下 {} 条相关招聘:", self.records.len());
        for record in &self.records {
            let _ = writeln!(
                out,
                "- [{}] {}\n  链接: {}",
                record.date.format(DATE_FORMAT),
                record.title,
                record.link
            );
        }
        out
    }

    pub fn render_html(&self) -> String {
        let mut items = String::new();
        for record in &self.records {
            let _ = write!(
                items,
                "<li><span style=\"color:#666\">[{}]</span> <a href=\"{}\">{}</a></li>",
                record.date.format(DATE_FORMAT),
                encode_double_quoted_attribute(&record.link),
                encode_text(&record.title)
            );
        }

        let mut html = String::new();
        let _ = write!(html, "<h3>{}</h3>", encode_text(&self.subject()));
        let _ = write!(html, "<p>日期: {}</p>", self.run_date.format(DATE_FORMAT));
        let _ = write!(html, "<p>关键词: {}</p>", encode_text(&join_keywords(&self.include_keywords)));
        let _ = write!(html, "<p>排除关键词: {}</p>", encode_text(&join_keywords(&self.exclude_keywords)));
        let _ = write!(html, "<hr><ul>{items}</ul><hr>");
        let _ = write!(
            html,
            "<p><a href=\"{}\">前往{}</a></p>",
            encode_double_quoted_attribute(&self.site_url),
            encode_text(&self.site_name)
        );
        if let Some(repo) = &self.repo_url {
            let _ = write!(
                html,
                "<p><a href=\"{}\">项目仓库</a></p>",
                encode_double_quoted_attribute(repo)
            );
        }
        html
    }
}

fn join_keywords(keywords: &[String]) -> String {
    if keywords.is_empty() {
        "无".to_string()
    } else {
        keywords.join("、")
    }
}

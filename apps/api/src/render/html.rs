use crate::models::document::DocumentResult;
use crate::models::user_data::UserData;

const PRINT_CSS: &str = r#"
body { font-family: "Inter", "Helvetica Neue", Arial, sans-serif; color: #111827; margin: 0; background: #f3f4f6; }
.page { background: #fff; max-width: 210mm; min-height: 297mm; margin: 24px auto; padding: 48px; box-sizing: border-box; }
.sheet { background: #fff; max-width: 210mm; margin: 24px auto; padding: 40px; box-sizing: border-box; }
header { text-align: center; border-bottom: 2px solid #111827; padding-bottom: 20px; margin-bottom: 28px; }
h1 { font-size: 32px; text-transform: uppercase; letter-spacing: -0.5px; margin: 0 0 8px; }
h2 { font-size: 15px; text-transform: uppercase; letter-spacing: 2px; color: #1e3a8a; border-bottom: 1px solid #d1d5db; margin: 24px 0 12px; }
.contact span + span::before { content: " | "; opacity: .3; }
.role { display: flex; justify-content: space-between; align-items: baseline; }
.company { color: #1d4ed8; font-weight: 600; font-size: 14px; margin: 2px 0 6px; }
.duration, .year { font-size: 11px; color: #6b7280; font-weight: 700; text-transform: uppercase; }
ul { margin: 0 0 16px 18px; padding: 0; font-size: 13px; line-height: 1.45; }
.skills span { display: inline-block; border: 1px solid #e5e7eb; padding: 3px 10px; margin: 0 6px 6px 0; font-size: 11px; font-weight: 700; }
.letter, .about { white-space: pre-wrap; font-size: 14px; line-height: 1.6; }
.headline { font-weight: 700; color: #1e40af; }
.actions { text-align: center; margin: 24px; }
.actions button { background: #2563eb; color: #fff; border: 0; border-radius: 999px; padding: 14px 40px; font-size: 16px; font-weight: 800; cursor: pointer; }
@media print {
  body { background: #fff; }
  .no-print { display: none !important; }
  .page { margin: 0; box-shadow: none; }
}
"#;

/// Escapes text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders the resume page plus the cover letter and LinkedIn sheets.
///
/// Only the resume page prints; the other sheets are marked `no-print`.
pub fn render_document(user: &UserData, result: &DocumentResult, auto_print: bool) -> String {
    let mut html = String::new();
    let title = escape_html(&user.full_name);

    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} - Resume</title>\n<style>{PRINT_CSS}</style>\n</head>\n<body>\n"
    ));

    html.push_str(
        "<p class=\"no-print actions\"><em>Tip: Use \"Save as PDF\" in print settings.</em></p>\n",
    );

    render_resume_page(&mut html, user, result);
    render_cover_letter(&mut html, result);
    render_linkedin(&mut html, result);

    html.push_str(
        "<div class=\"actions no-print\"><button onclick=\"window.print()\">Print / Save as PDF</button></div>\n",
    );
    if auto_print {
        html.push_str("<script>window.addEventListener('load', () => window.print());</script>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn render_resume_page(html: &mut String, user: &UserData, result: &DocumentResult) {
    let contact: Vec<String> = [&user.email, &user.phone, &user.location]
        .into_iter()
        .filter(|v| !v.trim().is_empty())
        .map(|v| format!("<span>{}</span>", escape_html(v)))
        .collect();

    html.push_str(&format!(
        "<section class=\"page\" id=\"resume\">\n<header>\n<h1>{}</h1>\n<div class=\"contact\">{}</div>\n</header>\n",
        escape_html(&user.full_name),
        contact.join("")
    ));

    html.push_str(&format!(
        "<h2>Professional Summary</h2>\n<p>{}</p>\n",
        escape_html(&result.resume_summary)
    ));

    if !user.experience.is_empty() {
        html.push_str("<h2>Work Experience</h2>\n");
        for (idx, exp) in user.experience.iter().enumerate() {
            html.push_str(&format!(
                "<div class=\"role\"><strong>{}</strong><span class=\"duration\">{}</span></div>\n\
                 <p class=\"company\">{}</p>\n<ul>\n",
                escape_html(&exp.title),
                escape_html(&exp.duration),
                escape_html(&exp.company)
            ));
            let bullets = result
                .experience_bullets
                .get(idx)
                .map(Vec::as_slice)
                .unwrap_or_default();
            for bullet in bullets {
                html.push_str(&format!("<li>{}</li>\n", escape_html(bullet)));
            }
            html.push_str("</ul>\n");
        }
    }

    if !user.education.is_empty() {
        html.push_str("<h2>Education</h2>\n");
        for edu in &user.education {
            html.push_str(&format!(
                "<div class=\"role\"><strong>{}</strong><span class=\"year\">{}</span></div>\n\
                 <p>{}<br>Score: {}%</p>\n",
                escape_html(&edu.degree),
                escape_html(&edu.year),
                escape_html(&edu.college),
                escape_html(&edu.percentage)
            ));
        }
    }

    if !user.skills.is_empty() {
        html.push_str("<h2>Key Skills</h2>\n<div class=\"skills\">");
        for skill in &user.skills {
            html.push_str(&format!("<span>{}</span>", escape_html(skill)));
        }
        html.push_str("</div>\n");
    }

    html.push_str("</section>\n");
}

fn render_cover_letter(html: &mut String, result: &DocumentResult) {
    if result.cover_letter.trim().is_empty() {
        return;
    }
    html.push_str(&format!(
        "<section class=\"sheet no-print\" id=\"cover-letter\">\n<h2>Professional Cover Letter</h2>\n\
         <div class=\"letter\">{}</div>\n</section>\n",
        escape_html(&result.cover_letter)
    ));
}

fn render_linkedin(html: &mut String, result: &DocumentResult) {
    html.push_str(&format!(
        "<section class=\"sheet no-print\" id=\"linkedin\">\n<h2>LinkedIn Profile Optimization</h2>\n\
         <p class=\"headline\">{}</p>\n<div class=\"about\">{}</div>\n",
        escape_html(&result.linkedin_headline),
        escape_html(&result.linkedin_summary)
    ));
    if !result.keyword_mapping.is_empty() {
        let keywords: Vec<String> = result
            .keyword_mapping
            .iter()
            .map(|k| escape_html(k))
            .collect();
        html.push_str(&format!("<p><small>Keywords: {}</small></p>\n", keywords.join(", ")));
    }
    html.push_str("</section>\n");
}

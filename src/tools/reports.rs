//! Report generation tools
//!
//! Generate a PDF journal report: profile header, daily nutrient table and a
//! macronutrient trend chart.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::{Datelike, NaiveDate, Weekday};
use printpdf::*;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{Database, DbResult};
use crate::models::{get_day_meals, list_meal_dates, MissionDay, MissionStatus, NutrientTotals, UserProfile};
use crate::nutrition::estimator::{CARB_HIGH_ABOVE, FAT_HIGH_ABOVE, PROTEIN_LOW_BELOW, SALT_HIGH_ABOVE};
use crate::nutrition::{estimate_day, Tendency};

use super::validate_date;

// ============================================================================
// Color Constants (RGB 0-255)
// ============================================================================

const COLOR_TITLE: (u8, u8, u8) = (0, 112, 192);
const COLOR_PROTEIN: (u8, u8, u8) = (0, 112, 192);
const COLOR_FAT: (u8, u8, u8) = (255, 165, 0);
const COLOR_CARB: (u8, u8, u8) = (0, 176, 80);
const COLOR_FLAGGED: (u8, u8, u8) = (255, 0, 0);
const COLOR_BLACK: (u8, u8, u8) = (0, 0, 0);
const COLOR_GRAY: (u8, u8, u8) = (128, 128, 128);

const LETTER_WIDTH_MM: f32 = 215.9;
const LETTER_HEIGHT_MM: f32 = 279.4;
const TABLE_BOTTOM_MM: f32 = 20.0;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub success: bool,
    pub file_path: String,
    pub days_reported: usize,
    pub meal_items: usize,
    pub date_range: String,
    pub message: String,
}

/// One table row: a day's totals, flags and mission outcome
#[derive(Debug, Clone, Serialize)]
pub struct DailyNutritionRow {
    pub date: String,
    pub day_of_week: String,
    pub item_count: usize,
    pub totals: NutrientTotals,
    pub tendencies: Vec<Tendency>,
    pub mission: MissionStatus,
}

// ============================================================================
// Aggregation
// ============================================================================

fn day_of_week_abbrev(date: &NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Short table code for a tendency
pub fn tendency_code(tendency: Tendency) -> &'static str {
    match tendency {
        Tendency::ProteinLow => "P-",
        Tendency::FatHigh => "F+",
        Tendency::CarbHigh => "C+",
        Tendency::SaltHigh => "S+",
    }
}

pub fn tendency_codes(tendencies: &[Tendency]) -> String {
    tendencies
        .iter()
        .map(|t| tendency_code(*t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn mission_cell(status: MissionStatus) -> &'static str {
    match status {
        MissionStatus::Achieved => "Done",
        MissionStatus::NotAchieved => "Not done",
        MissionStatus::Unset => "-",
    }
}

/// Rows for every date in the range that has at least one meal item
pub fn daily_rows(conn: &Connection, start_date: &str, end_date: &str) -> DbResult<Vec<DailyNutritionRow>> {
    let mut rows = Vec::new();

    for date in list_meal_dates(conn, Some(start_date), Some(end_date))? {
        let meals = get_day_meals(conn, &date)?;
        if meals.is_empty() {
            continue;
        }
        let estimate = estimate_day(&meals);
        let mission = MissionDay::get(conn, &date)?
            .map(|day| day.selected_status())
            .unwrap_or(MissionStatus::Unset);

        let day_of_week = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .ok()
            .map(|d| day_of_week_abbrev(&d))
            .unwrap_or("---");

        rows.push(DailyNutritionRow {
            day_of_week: day_of_week.to_string(),
            item_count: meals.item_count(),
            totals: estimate.totals,
            tendencies: estimate.tendencies,
            mission,
            date,
        });
    }

    Ok(rows)
}

// ============================================================================
// Chart Generation (plotters)
// ============================================================================

/// Generate the protein/fat/carbohydrate trend chart as PNG bytes
pub fn generate_macro_chart(rows: &[DailyNutritionRow], width: u32, height: u32) -> Result<Vec<u8>, String> {
    use plotters::prelude::*;
    use plotters_bitmap::BitMapBackend;

    if rows.is_empty() {
        return Err("No data to chart".to_string());
    }

    let mut buffer = vec![0u8; (width * height * 3) as usize];
    let x_end = rows.len() as i32;

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let y_max = rows
            .iter()
            .flat_map(|r| [r.totals.protein, r.totals.fat, r.totals.carbohydrate])
            .fold(CARB_HIGH_ABOVE, f64::max)
            * 1.1;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0..x_end, 0.0..y_max)
            .map_err(|e| e.to_string())?;

        chart
            .configure_mesh()
            .x_labels(rows.len().min(10))
            .x_label_formatter(&|x| {
                if *x >= 0 && (*x as usize) < rows.len() {
                    rows[*x as usize].date.split('-').skip(1).collect::<Vec<_>>().join("/")
                } else {
                    String::new()
                }
            })
            .y_desc("grams")
            .draw()
            .map_err(|e| e.to_string())?;

        // Threshold reference lines
        let series: [(&str, (u8, u8, u8), f64, fn(&NutrientTotals) -> f64); 3] = [
            ("Protein", COLOR_PROTEIN, PROTEIN_LOW_BELOW, |t| t.protein),
            ("Fat", COLOR_FAT, FAT_HIGH_ABOVE, |t| t.fat),
            ("Carbohydrate", COLOR_CARB, CARB_HIGH_ABOVE, |t| t.carbohydrate),
        ];

        for (_, (r, g, b), threshold, _) in series.iter() {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(0, *threshold), (x_end, *threshold)],
                    ShapeStyle::from(&RGBColor(*r, *g, *b).mix(0.4)).stroke_width(1),
                )))
                .map_err(|e| e.to_string())?;
        }

        for (label, (r, g, b), _, value) in series.iter() {
            let color = RGBColor(*r, *g, *b);
            let points: Vec<(i32, f64)> = rows
                .iter()
                .enumerate()
                .map(|(i, row)| (i as i32, value(&row.totals)))
                .collect();

            chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
                .map_err(|e| e.to_string())?
                .label(*label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

            chart
                .draw_series(points.iter().map(|(x, y)| Circle::new((*x, *y), 3, color.filled())))
                .map_err(|e| e.to_string())?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }

    // Convert RGB buffer to PNG
    let img = ::image::RgbImage::from_raw(width, height, buffer)
        .ok_or("Failed to create image from buffer")?;
    let mut png_bytes = Vec::new();
    ::image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut png_bytes), ::image::ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    Ok(png_bytes)
}

// ============================================================================
// PDF Generation Helper Functions
// ============================================================================

fn rgb_to_printpdf(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn add_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    x: Mm,
    y: Mm,
    size: f32,
    color: (u8, u8, u8),
) {
    layer.set_fill_color(rgb_to_printpdf(color.0, color.1, color.2));
    layer.use_text(text, size, x, y, font);
}

fn add_line(layer: &PdfLayerReference, x1: Mm, y1: Mm, x2: Mm, y2: Mm, color: (u8, u8, u8), width: f32) {
    layer.set_outline_color(rgb_to_printpdf(color.0, color.1, color.2));
    layer.set_outline_thickness(width);
    let line = Line {
        points: vec![(Point::new(x1, y1), false), (Point::new(x2, y2), false)],
        is_closed: false,
    };
    layer.add_line(line);
}

/// Profile line for the header. Builtin PDF fonts have no CJK glyphs, so only
/// ASCII fields are printed.
fn profile_lines(profile: Option<&UserProfile>) -> Vec<String> {
    let Some(profile) = profile else {
        return vec!["Profile: not registered".to_string()];
    };

    let esteem = match (profile.self_esteem_level, profile.self_esteem_score) {
        (Some(level), Some(score)) => format!("{} (score {})", level.as_str(), score),
        (Some(level), None) => level.as_str().to_string(),
        _ => "not assessed".to_string(),
    };

    vec![
        format!("Born: {}   Age: {}   Gender: {}", profile.birth, profile.age, profile.gender.as_str()),
        format!("Self-esteem: {}", esteem),
    ]
}

fn average(rows: &[DailyNutritionRow]) -> NutrientTotals {
    let sum = rows
        .iter()
        .fold(NutrientTotals::zero(), |acc, row| acc.add(&row.totals));
    sum.scale(1.0 / rows.len().max(1) as f64).rounded()
}

// ============================================================================
// Journal Report Generation
// ============================================================================

/// Generate a nutrition journal PDF report
pub fn generate_journal_report(
    db: &Database,
    start_date: &str,
    end_date: &str,
    output_path: &str,
) -> Result<GenerateReportResponse, String> {
    let start_date = validate_date(start_date)?;
    let end_date = validate_date(end_date)?;
    if start_date > end_date {
        return Err(format!("start_date {} is after end_date {}", start_date, end_date));
    }

    let (profile, rows) = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        let profile = UserProfile::get(&conn).map_err(|e| format!("Failed to get profile: {}", e))?;
        let rows = daily_rows(&conn, &start_date, &end_date)
            .map_err(|e| format!("Failed to load meals: {}", e))?;
        (profile, rows)
    };

    if rows.is_empty() {
        return Err(format!("No meals recorded between {} and {}", start_date, end_date));
    }

    let days_reported = rows.len();
    let meal_items: usize = rows.iter().map(|r| r.item_count).sum();
    let avg = average(&rows);
    let flagged = |t: Tendency| rows.iter().filter(|r| r.tendencies.contains(&t)).count();
    let missions_done = rows.iter().filter(|r| r.mission == MissionStatus::Achieved).count();
    let missions_chosen = rows.iter().filter(|r| r.mission != MissionStatus::Unset).count();

    // Page 1 - Portrait
    let (doc, page1, layer1) = PdfDocument::new("Wellness Journal Report", Mm(LETTER_WIDTH_MM), Mm(LETTER_HEIGHT_MM), "Layer 1");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(|e| e.to_string())?;
    let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(|e| e.to_string())?;
    let mut layer = doc.get_page(page1).get_layer(layer1);

    let margin_left = 15.0;
    let mut y = LETTER_HEIGHT_MM - 20.0;

    add_text(&layer, &font_bold, "Wellness Journal Report", Mm(margin_left), Mm(y), 18.0, COLOR_TITLE);
    y -= 10.0;

    for line in profile_lines(profile.as_ref()) {
        add_text(&layer, &font, &line, Mm(margin_left), Mm(y), 11.0, COLOR_BLACK);
        y -= 6.0;
    }
    add_text(&layer, &font, &format!("Report Period: {} to {}", start_date, end_date), Mm(margin_left), Mm(y), 11.0, COLOR_BLACK);
    let now = chrono::Local::now().format("%Y-%m-%d").to_string();
    add_text(&layer, &font, &format!("Generated: {}", now), Mm(120.0), Mm(y), 11.0, COLOR_BLACK);
    y -= 10.0;

    add_line(&layer, Mm(margin_left), Mm(y), Mm(200.0), Mm(y), COLOR_GRAY, 0.5);
    y -= 8.0;

    // Summary section
    add_text(&layer, &font_bold, "Summary", Mm(margin_left), Mm(y), 12.0, COLOR_BLACK);
    y -= 7.0;
    add_text(&layer, &font, &format!("Days Logged: {}", days_reported), Mm(margin_left), Mm(y), 10.0, COLOR_BLACK);
    add_text(&layer, &font, &format!("Meal Items: {}", meal_items), Mm(80.0), Mm(y), 10.0, COLOR_BLACK);
    add_text(&layer, &font, &format!("Missions Done: {} of {}", missions_done, missions_chosen), Mm(140.0), Mm(y), 10.0, COLOR_BLACK);
    y -= 6.0;
    add_text(
        &layer,
        &font,
        &format!(
            "Daily Average: P {:.1} g  F {:.1} g  C {:.1} g  {:.0} kcal  Salt {:.1} g",
            avg.protein, avg.fat, avg.carbohydrate, avg.calories, avg.salt
        ),
        Mm(margin_left),
        Mm(y),
        10.0,
        COLOR_BLACK,
    );
    y -= 6.0;
    add_text(
        &layer,
        &font,
        &format!(
            "Flagged Days: protein < {:.0} g: {}   fat > {:.0} g: {}   carbs > {:.0} g: {}   salt > {:.0} g: {}",
            PROTEIN_LOW_BELOW,
            flagged(Tendency::ProteinLow),
            FAT_HIGH_ABOVE,
            flagged(Tendency::FatHigh),
            CARB_HIGH_ABOVE,
            flagged(Tendency::CarbHigh),
            SALT_HIGH_ABOVE,
            flagged(Tendency::SaltHigh),
        ),
        Mm(margin_left),
        Mm(y),
        10.0,
        COLOR_BLACK,
    );
    y -= 12.0;

    // Daily table
    add_text(&layer, &font_bold, "Daily Nutrition", Mm(margin_left), Mm(y), 12.0, COLOR_BLACK);
    y -= 7.0;

    let col_widths = [22.0, 12.0, 10.0, 18.0, 18.0, 18.0, 18.0, 14.0, 26.0, 20.0];
    let headers = ["Date", "Day", "N", "Protein", "Fat", "Carbs", "kcal", "Salt", "Flags", "Mission"];
    let draw_header = |layer: &PdfLayerReference, y: f32| {
        let mut col_x = margin_left;
        for (i, header) in headers.iter().enumerate() {
            add_text(layer, &font_bold, header, Mm(col_x), Mm(y), 8.0, COLOR_BLACK);
            col_x += col_widths[i];
        }
    };
    draw_header(&layer, y);
    y -= 5.0;

    for row in &rows {
        if y < TABLE_BOTTOM_MM {
            let (page, page_layer) = doc.add_page(Mm(LETTER_WIDTH_MM), Mm(LETTER_HEIGHT_MM), "Table Page");
            layer = doc.get_page(page).get_layer(page_layer);
            y = LETTER_HEIGHT_MM - 20.0;
            draw_header(&layer, y);
            y -= 5.0;
        }

        let row_color = if row.tendencies.is_empty() { COLOR_BLACK } else { COLOR_FLAGGED };
        let values = [
            row.date.clone(),
            row.day_of_week.clone(),
            row.item_count.to_string(),
            format!("{:.1}", row.totals.protein),
            format!("{:.1}", row.totals.fat),
            format!("{:.1}", row.totals.carbohydrate),
            format!("{:.0}", row.totals.calories),
            format!("{:.1}", row.totals.salt),
            tendency_codes(&row.tendencies),
            mission_cell(row.mission).to_string(),
        ];

        let mut col_x = margin_left;
        for (i, value) in values.iter().enumerate() {
            let color = if i == 8 { row_color } else { COLOR_BLACK };
            add_text(&layer, &font, value, Mm(col_x), Mm(y), 7.0, color);
            col_x += col_widths[i];
        }
        y -= 4.5;
    }

    // ========================================================================
    // Landscape page for the chart
    // ========================================================================
    let (page2, layer2) = doc.add_page(Mm(LETTER_HEIGHT_MM), Mm(LETTER_WIDTH_MM), "Chart Page");
    let layer2 = doc.get_page(page2).get_layer(layer2);

    let mut y2 = LETTER_WIDTH_MM - 20.0;

    add_text(&layer2, &font_bold, "Macronutrient Trend", Mm(margin_left), Mm(y2), 16.0, COLOR_TITLE);
    add_text(&layer2, &font, &format!("{} - {}", start_date, end_date), Mm(120.0), Mm(y2), 11.0, COLOR_BLACK);
    y2 -= 10.0;

    match generate_macro_chart(&rows, 1000, 400) {
        Ok(png_bytes) => {
            let dynamic_image = printpdf::image_crate::load_from_memory(&png_bytes).map_err(|e| e.to_string())?;
            let pdf_image = Image::from_dynamic_image(&dynamic_image);

            // 1000x400 pixels at 120 DPI is about 212mm x 85mm
            let transform = ImageTransform {
                translate_x: Some(Mm(margin_left)),
                translate_y: Some(Mm(y2 - 90.0)),
                dpi: Some(120.0),
                ..Default::default()
            };
            pdf_image.add_to_layer(layer2.clone(), transform);
            y2 -= 95.0;
        }
        Err(e) => {
            tracing::warn!(error = %e, "chart generation failed");
            add_text(&layer2, &font, &format!("Chart generation error: {}", e), Mm(margin_left), Mm(y2 - 10.0), 9.0, COLOR_FLAGGED);
            y2 -= 15.0;
        }
    }

    y2 -= 5.0;
    add_text(&layer2, &font_bold, "Reference lines:", Mm(margin_left), Mm(y2), 10.0, COLOR_BLACK);
    add_text(&layer2, &font, &format!("Protein low below {:.0} g", PROTEIN_LOW_BELOW), Mm(50.0), Mm(y2), 10.0, COLOR_PROTEIN);
    add_text(&layer2, &font, &format!("Fat high above {:.0} g", FAT_HIGH_ABOVE), Mm(110.0), Mm(y2), 10.0, COLOR_FAT);
    add_text(&layer2, &font, &format!("Carbohydrate high above {:.0} g", CARB_HIGH_ABOVE), Mm(160.0), Mm(y2), 10.0, COLOR_CARB);

    // Save PDF
    let path = Path::new(output_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let file = File::create(path).map_err(|e| e.to_string())?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer).map_err(|e| e.to_string())?;

    tracing::info!(path = output_path, days = days_reported, "journal report written");
    Ok(GenerateReportResponse {
        success: true,
        file_path: output_path.to_string(),
        days_reported,
        meal_items,
        date_range: format!("{} to {}", start_date, end_date),
        message: format!(
            "Journal report generated with {} meal items over {} days",
            meal_items, days_reported
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{meals, missions};

    fn db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let database = crate::db::open_and_migrate(&dir.path().join("wellness.db")).unwrap();
        (dir, database)
    }

    #[test]
    fn test_tendency_codes() {
        assert_eq!(tendency_codes(&[]), "");
        assert_eq!(
            tendency_codes(&[Tendency::ProteinLow, Tendency::SaltHigh]),
            "P- S+"
        );
    }

    #[tokio::test]
    async fn test_daily_rows_carry_mission_status() {
        let (_dir, db) = db();
        meals::add_meal_item(&db, "2025-06-01", "朝食", "パン", None).unwrap();
        meals::add_meal_item(&db, "2025-06-02", "夕食", "肉", Some("多め")).unwrap();
        meals::add_meal_item(&db, "2025-06-05", "夕食", "魚", None).unwrap();
        missions::get_missions(&db, &crate::coach::DisabledGenerator, "2025-06-02").await.unwrap();
        missions::choose_mission(&db, "2025-06-02", Some(0), None).unwrap();
        missions::set_mission_status(&db, "2025-06-02", true).unwrap();

        let conn = db.get_conn().unwrap();
        let rows = daily_rows(&conn, "2025-06-01", "2025-06-03").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].day_of_week, "Sun");
        assert_eq!(rows[0].mission, MissionStatus::Unset);
        assert_eq!(rows[1].mission, MissionStatus::Achieved);
        assert_eq!(rows[1].tendencies, vec![Tendency::ProteinLow]);
    }

    #[test]
    fn test_report_written() {
        let (dir, db) = db();
        meals::add_meal_item(&db, "2025-06-01", "朝食", "ごはん", None).unwrap();
        meals::add_meal_item(&db, "2025-06-01", "夕食", "揚げ物", Some("多め")).unwrap();

        let output = dir.path().join("reports").join("journal.pdf");
        let resp = generate_journal_report(&db, "2025-06-01", "2025-06-30", output.to_str().unwrap()).unwrap();
        assert!(resp.success);
        assert_eq!(resp.days_reported, 1);
        assert_eq!(resp.meal_items, 2);

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_report_requires_meals_in_range() {
        let (dir, db) = db();
        meals::add_meal_item(&db, "2025-05-01", "朝食", "パン", None).unwrap();
        let output = dir.path().join("journal.pdf");

        let err = generate_journal_report(&db, "2025-06-01", "2025-06-30", output.to_str().unwrap()).unwrap_err();
        assert!(err.contains("No meals recorded"));
        assert!(!output.exists());

        assert!(generate_journal_report(&db, "2025-06-30", "2025-06-01", output.to_str().unwrap()).is_err());
    }
}

use crate::infra::{parse_amount, parse_option};
use clap::Args;
use loan_approval::config::AppConfig;
use loan_approval::error::AppError;
use loan_approval::telemetry;
use loan_approval::workflows::approval::explain::render_text;
use loan_approval::workflows::approval::{
    ApplicantForm, ApplicantRecord, ApprovalReport, BannerKind, CreditGrade, EmploymentLength,
    HomeOwnership, LoanApprovalService, LoanPurpose, ModelLoader, ModelStatusView,
};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct PredictArgs {
    /// Requested loan amount (defaults to 8000)
    #[arg(long, value_parser = parse_amount)]
    pub(crate) loan_amount: Option<f64>,
    /// Annual income (defaults to 80000)
    #[arg(long, value_parser = parse_amount)]
    pub(crate) annual_income: Option<f64>,
    /// Interest rate in percent (defaults to 11.5)
    #[arg(long, value_parser = parse_amount)]
    pub(crate) int_rate: Option<f64>,
    /// Debt-to-income ratio (defaults to 15.0)
    #[arg(long, value_parser = parse_amount)]
    pub(crate) dti: Option<f64>,
    /// Employment length, e.g. "< 1 year", "5 years", "10+ years"
    #[arg(long, value_parser = parse_option::<EmploymentLength>)]
    pub(crate) emp_length: Option<EmploymentLength>,
    /// Loan purpose: debt_consolidation, credit_card, home_improvement or major_purchase
    #[arg(long, value_parser = parse_option::<LoanPurpose>)]
    pub(crate) purpose: Option<LoanPurpose>,
    /// Credit grade A through G
    #[arg(long, value_parser = parse_option::<CreditGrade>)]
    pub(crate) grade: Option<CreditGrade>,
    /// Home ownership: RENT, MORTGAGE or OWN
    #[arg(long, value_parser = parse_option::<HomeOwnership>)]
    pub(crate) home_ownership: Option<HomeOwnership>,
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Write the attribution waterfall as SVG to this path
    #[arg(long)]
    pub(crate) chart_svg: Option<PathBuf>,
    /// Print the full report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

impl PredictArgs {
    fn form(&self) -> ApplicantForm {
        let defaults = ApplicantForm::default();
        ApplicantForm {
            loan_amount: self.loan_amount.unwrap_or(defaults.loan_amount),
            annual_income: self.annual_income.unwrap_or(defaults.annual_income),
            interest_rate: self.int_rate.unwrap_or(defaults.interest_rate),
            debt_to_income: self.dti.unwrap_or(defaults.debt_to_income),
            employment_length: self.emp_length.unwrap_or(defaults.employment_length),
            purpose: self.purpose.unwrap_or(defaults.purpose),
            credit_grade: self.grade.unwrap_or(defaults.credit_grade),
            home_ownership: self.home_ownership.unwrap_or(defaults.home_ownership),
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct ModelStatusArgs {
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let record = ApplicantRecord::try_from(args.form())?;
    let model_path = args.model.clone().unwrap_or(config.model.path);
    let service = LoanApprovalService::new(ModelLoader::new(model_path).load_status());
    if !args.json {
        println!("{}", render_model_status(&service.model_status()));
    }
    let report = service.assess(record)?;

    if let Some(path) = &args.chart_svg {
        match &report.explanation {
            Some(explanation) => std::fs::write(path, &explanation.svg)?,
            None => eprintln!("No chart written to {}", path.display()),
        }
    }

    if args.json {
        let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        println!("{}", render_report(&report));
    }

    Ok(())
}

pub(crate) fn run_model_status(args: ModelStatusArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let model_path = args.model.unwrap_or(config.model.path);
    let view = ModelLoader::new(model_path).load_status().view();

    println!("Model status: {}", view.state);
    println!("- path: {}", view.path);
    if let Some(name) = &view.model_name {
        println!("- model: {name}");
    }
    if let Some(loaded_at) = view.loaded_at {
        println!("- loaded at: {}", loaded_at.to_rfc3339());
    }
    if let Some(kind) = view.kind {
        println!("- failure: {}", kind.label());
    }
    println!("{}", view.message);

    Ok(())
}

fn render_model_status(view: &ModelStatusView) -> String {
    match view.state {
        "loaded" => format!("[MODEL] {}", view.message),
        _ => format!("[MODEL] Model not loaded or invalid: {}", view.message),
    }
}

fn render_report(report: &ApprovalReport) -> String {
    let tag = match report.banner.kind {
        BannerKind::Success => "APPROVED",
        BannerKind::Error => "REJECTED",
        BannerKind::Warning => "NOT APPROVED",
    };

    let applicant = &report.applicant;
    let mut lines = vec![
        format!("[{tag}] {}", report.banner.message),
        String::new(),
        "Applicant".to_string(),
        format!("- loan_amount: {}", applicant.loan_amount()),
        format!("- annual_income: {}", applicant.annual_income()),
        format!("- int_rate: {}", applicant.interest_rate()),
        format!("- dti: {}", applicant.debt_to_income()),
        format!("- emp_length: {}", applicant.employment_length()),
        format!("- purpose: {}", applicant.purpose()),
        format!("- grade: {}", applicant.credit_grade()),
        format!("- home_ownership: {}", applicant.home_ownership()),
        String::new(),
        format!(
            "Model probability: {:.2}% (class {})",
            report.prediction.probability * 100.0,
            report.prediction.label
        ),
        format!(
            "Monthly income: {:.2} | Maximum loan allowed: {:.2}",
            report.policy.monthly_income, report.policy.max_loan_allowed
        ),
    ];

    for reason in &report.policy.reasons {
        lines.push(format!("  ! {reason}"));
    }

    lines.push(String::new());
    match (&report.explanation, &report.explanation_warning) {
        (Some(explanation), _) => {
            lines.push("Feature attribution (log-odds)".to_string());
            lines.push(render_text(&explanation.waterfall));
        }
        (None, Some(warning)) => lines.push(warning.clone()),
        (None, None) => {}
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_approval::workflows::approval::{ModelStatus, ScoringModel, InferenceError};
    use std::sync::Arc;

    struct FixedModel(f64);

    impl ScoringModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict(&self, _record: &ApplicantRecord) -> Result<i64, InferenceError> {
            Ok(i64::from(self.0 >= 0.5))
        }

        fn predict_probability(&self, _record: &ApplicantRecord) -> Result<f64, InferenceError> {
            Ok(self.0)
        }
    }

    fn report_for(args: &PredictArgs, probability: f64) -> ApprovalReport {
        let service = LoanApprovalService::new(ModelStatus::loaded(
            Arc::new(FixedModel(probability)),
            "fixed.json",
        ));
        let record = ApplicantRecord::try_from(args.form()).expect("valid form");
        service.assess(record).expect("assessment succeeds")
    }

    #[test]
    fn model_status_line_reports_success_and_failure() {
        let loaded = LoanApprovalService::new(ModelStatus::loaded(
            Arc::new(FixedModel(0.5)),
            "fixed.json",
        ));
        assert_eq!(
            render_model_status(&loaded.model_status()),
            "[MODEL] Model loaded successfully."
        );

        let missing = ModelLoader::new("no/such/dir/absent.json").load_status().view();
        let line = render_model_status(&missing);
        assert!(line.starts_with("[MODEL] Model not loaded or invalid: model file not found"));
    }

    #[test]
    fn unset_flags_fall_back_to_form_defaults() {
        let form = PredictArgs::default().form();

        assert_eq!(form, ApplicantForm::default());
    }

    #[test]
    fn rendered_report_leads_with_the_banner() {
        let args = PredictArgs {
            annual_income: Some(2_000_000.0),
            emp_length: Some(EmploymentLength::FiveYears),
            ..PredictArgs::default()
        };

        let rendered = render_report(&report_for(&args, 0.9));

        let first = rendered.lines().next().expect("banner line");
        assert_eq!(first, "[APPROVED] Loan Approved with 90.00% probability.");
        assert!(rendered.contains("- emp_length: 5 years"));
        assert!(rendered.contains("Could not generate attribution plot"));
    }

    #[test]
    fn rendered_report_lists_policy_reasons() {
        let rendered = render_report(&report_for(&PredictArgs::default(), 0.9));

        assert!(rendered.starts_with("[REJECTED]"));
        assert!(rendered.contains("  ! Monthly income is below RWF 120,000"));
        assert!(rendered.contains("  ! Insufficient employment history"));
    }
}

use concprobe::search::{ProbePlan, ProbeResult, SearchObserver};

use super::summary::{
    batch_report_lines, plan_label, print_lines, probe_report_lines, verdict_line,
    verification_header_lines,
};

/// Which report a [`ConsoleObserver`] prints as probes finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReportStyle {
    /// Condensed block per probe plus a verdict line.
    Search,
    /// Full latency report per probe, titled with its combination.
    Sweep,
}

/// Prints probe progress to stdout as the driver reports it.
pub(crate) struct ConsoleObserver {
    style: ReportStyle,
    detailed: bool,
    current: Option<ProbePlan>,
}

impl ConsoleObserver {
    pub(crate) const fn new(style: ReportStyle, detailed: bool) -> Self {
        Self {
            style,
            detailed,
            current: None,
        }
    }

    fn report(&self, result: &ProbeResult) -> Vec<String> {
        let title = self
            .current
            .as_ref()
            .map_or_else(|| plan_label_for(result), plan_label);
        match self.style {
            ReportStyle::Sweep => batch_report_lines(&title, &result.summary),
            ReportStyle::Search if self.detailed => batch_report_lines(&title, &result.summary),
            ReportStyle::Search => probe_report_lines(result),
        }
    }
}

fn plan_label_for(result: &ProbeResult) -> String {
    plan_label(&ProbePlan {
        concurrency: result.concurrency,
        request_count: result.summary.total,
        rate_limit: result.rate_limit,
    })
}

impl SearchObserver for ConsoleObserver {
    fn on_probe_start(&mut self, plan: ProbePlan) {
        self.current = Some(plan);
        match self.style {
            ReportStyle::Search => println!("\nTesting concurrency: {}...", plan.concurrency),
            ReportStyle::Sweep => println!("\nRunning: {}", plan_label(&plan)),
        }
    }

    fn on_probe_complete(&mut self, result: &ProbeResult) {
        print_lines(&self.report(result));
        if self.style == ReportStyle::Search {
            println!("{}", verdict_line(result));
        }
        self.current = None;
    }

    fn on_verification_start(&mut self, plan: ProbePlan) {
        self.current = Some(plan);
        print_lines(&verification_header_lines(&plan));
    }

    fn on_verification_complete(&mut self, result: &ProbeResult) {
        print_lines(&self.report(result));
        self.current = None;
    }
}

mod lines;


pub(crate) use lines::{
    batch_report_lines, comparison_lines, plan_label, probe_report_lines, search_header_lines,
    search_summary_lines, sweep_header_lines, verdict_line, verification_header_lines,
};

pub(crate) fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

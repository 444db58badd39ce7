use super::types::RunReport;
use crate::runner::recorder::render_details;
use crate::runner::state::TestResult;
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

const SUITE_NAME: &str = "expertbridge-api";

/// JUnit XML for a run, one `<testcase>` per recorded result.
///
/// `tests` and `failures` count records, not cases: the composite error case
/// contributes three testcases, so a full core run reports 14 tests while the
/// console summary tallies 12 cases. The case tally is kept on the
/// `<testsuites>` element as `cases` and `failedCases`.
pub fn generate_junit_xml(report: &RunReport) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let tests = report.results.len().to_string();
    let failures = report
        .results
        .iter()
        .filter(|r| !r.success)
        .count()
        .to_string();
    let timestamp = report.generated_at.to_rfc3339();

    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", SUITE_NAME));
    suites_start.push_attribute(("tests", tests.as_str()));
    suites_start.push_attribute(("failures", failures.as_str()));
    let cases = report.summary.total.to_string();
    let failed_cases = report.summary.failed.to_string();
    suites_start.push_attribute(("cases", cases.as_str()));
    suites_start.push_attribute(("failedCases", failed_cases.as_str()));
    writer.write_event(Event::Start(suites_start))?;

    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", report.base_url.as_str()));
    suite_start.push_attribute(("tests", tests.as_str()));
    suite_start.push_attribute(("failures", failures.as_str()));
    suite_start.push_attribute(("skipped", "0"));
    suite_start.push_attribute(("id", report.run_id.as_str()));
    suite_start.push_attribute(("timestamp", timestamp.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for result in &report.results {
        write_test_case(&mut writer, result)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let xml = String::from_utf8(writer.into_inner().into_inner())?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(writer: &mut Writer<W>, result: &TestResult) -> Result<()> {
    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", result.name.as_str()));
    case_start.push_attribute(("classname", SUITE_NAME));
    writer.write_event(Event::Start(case_start))?;

    if !result.success {
        let mut fail_start = BytesStart::new("failure");
        fail_start.push_attribute(("message", result.message.as_str()));
        writer.write_event(Event::Start(fail_start))?;

        if let Some(details) = &result.details {
            writer.write_event(Event::Text(BytesText::new(&render_details(details))))?;
        }

        writer.write_event(Event::End(BytesEnd::new("failure")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

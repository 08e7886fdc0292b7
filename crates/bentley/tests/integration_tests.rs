use bentley::*;

#[test]
fn test_basic_logging_functions() {
  // Test that basic logging functions can be called without panicking
  info("Test info message");
  warn("Test warning message");
  error("Test error message");
  debug("Test debug message");
  success("Test success message");
  verbose("Test verbose message");
}

#[test]
fn test_multiline_messages() {
  let multiline_msg = "First line\nSecond line\nThird line";
  info(multiline_msg);
  warn(multiline_msg);
  error(multiline_msg);
}

#[test]
fn test_headings() {
  title("Clustered Incident Analysis");
  subheader("Incidents");
}

#[test]
fn test_macros_expand() {
  bentley::info!("macro info");
  bentley::warn!("macro warn");
  bentley::error!("macro error");
  bentley::success!("macro success");
}

#[test]
fn test_badge_keeps_label_text() {
  colored::control::set_override(false);
  let label = badge("network");
  assert!(label.contains("network"));
}

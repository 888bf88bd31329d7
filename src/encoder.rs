//! AUTOEXEC.BAT content generator

use crate::messages::{Messages, MSG_AUTOGENERATED, MSG_CONFIG_SECTION};
use crate::sections::{Provenance, SectionBuffer};
use crate::variables::VariableRegistry;
use anyhow::Result;

/// DOS line ending
pub const DOS_NEWLINE: &str = "\r\n";

const COMMENT: &str = ":: ";

/// Renders the section buffer and variables into the canonical script text
pub struct Encoder {
    comment_generated: String,
    comment_config_section: String,
}

impl Encoder {
    /// Create an encoder with the default header messages
    pub fn new() -> Self {
        Self::with_messages(&Messages::new())
    }

    /// Create an encoder using the given message table for headers
    pub fn with_messages(messages: &Messages) -> Self {
        Self {
            comment_generated: format!("{COMMENT}{}", messages.get(MSG_AUTOGENERATED)),
            comment_config_section: format!("{COMMENT}{}", messages.get(MSG_CONFIG_SECTION)),
        }
    }

    /// Render the canonical (UTF-8) AUTOEXEC.BAT content
    pub fn render(
        &self,
        sections: &SectionBuffer,
        variables: &VariableRegistry,
        echo_off: bool,
    ) -> String {
        let mut output = String::new();

        // Provenance of the lines printed last, if any
        let mut printing: Option<Provenance> = None;

        // Put 'ECHO OFF' and 'SET variable=value' if needed
        if echo_off || !variables.is_empty() {
            push_line(&mut output, &self.comment_generated);
            printing = Some(Provenance::Generated);
        }

        if echo_off {
            push_line(&mut output, "");
            push_line(&mut output, "@ECHO OFF");
        }

        if !variables.is_empty() {
            push_line(&mut output, "");
            for (name, value) in variables.snapshot() {
                push_line(&mut output, &format!("@SET {name}={value}"));
            }
        }

        if printing.is_some() {
            push_line(&mut output, "");
        }

        for (location, lines) in sections.iter() {
            if lines.is_empty() {
                continue;
            }

            let provenance = location.provenance();
            if printing != Some(provenance) {
                if !output.is_empty() {
                    push_line(&mut output, "");
                }
                push_line(&mut output, self.header(provenance));
                push_line(&mut output, "");
                printing = Some(provenance);
            }

            for line in lines {
                push_line(&mut output, line);
            }
        }

        output
    }

    /// Render directly to a writer
    pub fn render_to_writer<W: std::io::Write>(
        &self,
        sections: &SectionBuffer,
        variables: &VariableRegistry,
        echo_off: bool,
        mut writer: W,
    ) -> Result<()> {
        let rendered = self.render(sections, variables, echo_off);
        writer.write_all(rendered.as_bytes())?;
        Ok(())
    }

    fn header(&self, provenance: Provenance) -> &str {
        match provenance {
            Provenance::Generated => &self.comment_generated,
            Provenance::ConfigSection => &self.comment_config_section,
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

fn push_line(output: &mut String, line: &str) {
    output.push_str(line);
    output.push_str(DOS_NEWLINE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty() {
        let encoder = Encoder::new();
        let result = encoder.render(&SectionBuffer::new(), &VariableRegistry::new(), false);
        assert_eq!(result, "");
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut sections = SectionBuffer::new();
        sections.add_command_before("@Z:\\MOUNT.COM C \"games\"");
        sections.add_autoexec_line("dir");
        let mut variables = VariableRegistry::new();
        variables.set("blaster", "A220 I7 D1 H5 T6");

        let encoder = Encoder::new();
        let first = encoder.render(&sections, &variables, true);
        let second = encoder.render(&sections, &variables, true);
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_sections_in_fixed_order() {
        let mut sections = SectionBuffer::new();
        sections.add_command_after("@EXIT");
        sections.add_autoexec_line("dir");
        sections.add_command_before("@C:");

        let result = Encoder::new().render(&sections, &VariableRegistry::new(), false);
        assert_eq!(
            result,
            ":: autogenerated\r\n\r\n@C:\r\n\r\n\
             :: from [autoexec] section\r\n\r\ndir\r\n\r\n\
             :: autogenerated\r\n\r\n@EXIT\r\n"
        );
    }

    #[test]
    fn test_render_variables_and_echo_off() {
        let mut variables = VariableRegistry::new();
        variables.set("B", "2");
        variables.set("A", "1");
        let mut sections = SectionBuffer::new();
        sections.add_autoexec_line("game.exe");

        let result = Encoder::new().render(&sections, &variables, true);
        assert_eq!(
            result,
            ":: autogenerated\r\n\r\n@ECHO OFF\r\n\r\n@SET A=1\r\n@SET B=2\r\n\r\n\r\n\
             :: from [autoexec] section\r\n\r\ngame.exe\r\n"
        );
    }

    #[test]
    fn test_generated_run_does_not_repeat_header() {
        let mut variables = VariableRegistry::new();
        variables.set("PATH", "Z:\\");
        let mut sections = SectionBuffer::new();
        sections.add_command_before("@C:");
        sections.add_command_after("@EXIT");

        let result = Encoder::new().render(&sections, &variables, false);
        assert_eq!(result.matches(":: autogenerated").count(), 1);
        assert_eq!(
            result,
            ":: autogenerated\r\n\r\n@SET PATH=Z:\\\r\n\r\n@C:\r\n@EXIT\r\n"
        );
    }

    #[test]
    fn test_blank_lines_are_kept() {
        let mut sections = SectionBuffer::new();
        sections.add_autoexec_line("");
        sections.add_autoexec_line("");

        let result = Encoder::new().render(&sections, &VariableRegistry::new(), false);
        assert_eq!(result, ":: from [autoexec] section\r\n\r\n\r\n\r\n");
    }

    #[test]
    fn test_translated_headers() {
        let mut messages = Messages::new();
        messages.add(MSG_CONFIG_SECTION, "aus Abschnitt [autoexec]");
        let mut sections = SectionBuffer::new();
        sections.add_autoexec_line("ver");

        let result =
            Encoder::with_messages(&messages).render(&sections, &VariableRegistry::new(), false);
        assert!(result.starts_with(":: aus Abschnitt [autoexec]\r\n"));
    }

    #[test]
    fn test_render_to_writer() {
        let mut sections = SectionBuffer::new();
        sections.add_command_before("@C:");
        let mut buffer = Vec::new();

        Encoder::new()
            .render_to_writer(&sections, &VariableRegistry::new(), false, &mut buffer)
            .unwrap();
        assert_eq!(buffer, b":: autogenerated\r\n\r\n@C:\r\n");
    }
}

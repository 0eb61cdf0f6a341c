//! Static Helvetica metrics used to reflow exported reports to a fixed page width.
//!
//! Character widths are in em units (relative to font size), taken from the
//! standard Helvetica AFM. Close enough to what a PDF viewer would lay out for
//! the line breaks to land in the same places.
//! The table covers ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

/// Layout parameters for the exported document body.
///
/// `text_width_em` is the usable text width in em units at the given font size.
/// A4 with a 180mm text column at 12pt → 180mm × (72pt/in ÷ 25.4mm/in) ÷ 12pt ≈ 42.5em.
#[derive(Debug, Clone)]
pub struct PageConfig {
    pub text_width_em: f32,
}

pub fn default_page_config() -> PageConfig {
    PageConfig {
        text_width_em: 180.0 / 25.4 * 72.0 / 12.0,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for characters with no ASCII base letter.
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    fn char_width(&self, c: char) -> f32 {
        let code = fold_latin1(c) as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        }
    }

    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Greedy word-wrap of `text` at `config.text_width_em`.
    ///
    /// Source line breaks are kept (blank lines included). Runs of spaces inside
    /// a line collapse to one. A word wider than the whole line is split by character.
    pub fn wrap(&self, text: &str, config: &PageConfig) -> Vec<String> {
        text.lines()
            .flat_map(|line| self.wrap_line(line, config.text_width_em))
            .collect()
    }

    fn wrap_line(&self, line: &str, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in line.split_whitespace() {
            let word_w = self.measure_str(word);

            if word_w > max_width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let (chunks, rest) = self.split_long_word(word, max_width);
                lines.extend(chunks);
                current_width = self.measure_str(&rest);
                current = rest;
                continue;
            }

            let space_w = if current.is_empty() { 0.0 } else { self.space_width };
            if !current.is_empty() && current_width + space_w + word_w > max_width {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_w;
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_width += space_w + word_w;
            }
        }

        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Splits an over-wide word into full-width chunks plus a trailing remainder.
    fn split_long_word(&self, word: &str, max_width: f32) -> (Vec<String>, String) {
        let mut chunks = Vec::new();
        let mut chunk = String::new();
        let mut width = 0.0_f32;

        for c in word.chars() {
            let w = self.char_width(c);
            if !chunk.is_empty() && width + w > max_width {
                chunks.push(std::mem::take(&mut chunk));
                width = 0.0;
            }
            chunk.push(c);
            width += w;
        }
        (chunks, chunk)
    }
}

/// Maps accented Latin-1 letters to their ASCII base so they measure like it.
fn fold_latin1(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        other => other,
    }
}

/// Helvetica, the default face of most PDF toolkits.
pub static HELVETICA: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
};

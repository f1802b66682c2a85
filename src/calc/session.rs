use super::{matrix_size, CalcError, Calculator, Value};
use crate::{
    config::{Config, DisplayMode},
    fraction::ParseFractionError,
    Fraction
};
use log::{debug, trace};
use std::io::{self, prelude::*};
use thiserror::Error;

const DESCRIPTION: &str = "\
-----------------------------------------------
This calculator works with integers, fractions and matrices,
all of them exact. It uses Reverse Polish Notation: operations
are written after their operands, so \"2+3\" is written \"2 3 +\".
Numbers and matrices go on \"the stack\" as they are entered,
the newest on top, and stay there until they are used.
Operations work on the top of the stack: unary ones like 'c'
(change sign) on the top entry, binary ones like '+' on the top
two entries. Press enter to see the stack.
-----------------------------------------------
";

const INSTRUCTIONS: &str = "\
-----------------------------------------------
'+': Add the top two entries on the stack.
'-': Subtract the top entry from the entry below it.
'*': Multiply the top two entries on the stack.
     For matrices, A * B is calculated if A is below B.
'/': Divide the second entry on the stack by the top entry.
'^': Raise the second entry to the power of the top entry.
'!': Take the factorial of the top number on the stack.
'|': Take the absolute value of the top number, or push the
     determinant of the matrix on top.
'c': Change the sign of the top entry on the stack.
'd': Duplicate the top entry on the stack.
'h': Open the help screen.
'i': Replace the top number with its reciprocal.
'o': Open the options screen.
'p': Pop the top entry off of the stack.
'r': Take the square root of the top number, or reduce the
     matrix on top to reduced row echelon form.
's': Swap the top two entries on the stack.
't': Transpose the matrix on top of the stack.
'z': \"Zero\", or empty, the stack.
'm': Open the matrix screen, which creates matrices or changes
     the matrix on top of the stack.
From the matrix screen, the following commands are allowed:
'a': Add a multiple of one row to another.
'e': Reduce the matrix to reduced row echelon form.
'i': Create an identity matrix of a particular size.
'm': Multiply a row by a certain factor.
'n': Create a new matrix, to push onto the stack.
's': Swap two rows of a matrix.
'r': Return to the calculator.
From any screen, you may type 'q' to quit the calculator.
-----------------------------------------------
";

const OPTIONS: &str = "\
Enter 'd' to toggle fraction/decimal display.
Enter 'p' to toggle prompts.
Enter 'r' to return to the calculator.
";

/// Whether the session should keep reading commands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit
}

/// What interrupts a command
#[derive(Error, Debug)]
enum Interrupt {
    #[error(transparent)]
    Calc(#[from] CalcError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("end of input")]
    Eof
}

/// An interactive calculator session. Commands are single keystrokes read
/// from `input`, and everything the user should see goes to `output`.
pub struct Session<R, W> {
    input: R,
    output: W,
    config: Config,
    calc: Calculator,
    pending: Option<char>
}
impl<R: BufRead, W: Write> Session<R, W> {
    /// Create a new session with an empty stack
    pub fn new(input: R, output: W, config: Config) -> Self {
        Self {
            input,
            output,
            config,
            calc: Calculator::new(),
            pending: None
        }
    }
    /// The calculator behind this session
    pub fn calculator(&self) -> &Calculator {
        &self.calc
    }
    /// The current settings, which the options screen can change
    pub fn config(&self) -> &Config {
        &self.config
    }
    /// Consume the session and return the output
    pub fn into_output(self) -> W {
        self.output
    }

    fn next_char(&mut self) -> io::Result<Option<char>> {
        if let Some(c) = self.pending.take() {
            return Ok(Some(c));
        }
        // Prompts don't end in a newline
        self.output.flush()?;
        let first = match self.next_byte()? {
            Some(byte) => byte,
            None => return Ok(None)
        };
        let width = match first {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1
        };
        let mut bytes = [first, 0, 0, 0];
        for byte in &mut bytes[1..width] {
            *byte = self.next_byte()?.unwrap_or(0);
        }
        Ok(Some(std::str::from_utf8(&bytes[..width])
            .ok()
            .and_then(|c| c.chars().next())
            .unwrap_or(std::char::REPLACEMENT_CHARACTER)))
    }
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = match self.input.fill_buf()?.first() {
            Some(&byte) => byte,
            None => return Ok(None)
        };
        self.input.consume(1);
        Ok(Some(byte))
    }
    fn peek_char(&mut self) -> io::Result<Option<char>> {
        let c = self.next_char()?;
        self.pending = c;
        Ok(c)
    }
    /// Read the next character that isn't whitespace
    fn read_key(&mut self) -> Result<char, Interrupt> {
        loop {
            match self.next_char()? {
                Some(c) if c.is_whitespace() => (),
                Some(c) => return Ok(c),
                None => return Err(Interrupt::Eof)
            }
        }
    }
    /// Read a whitespace separated word. The whitespace after it is left
    /// unread.
    fn read_token(&mut self) -> Result<String, Interrupt> {
        let mut token = String::new();
        token.push(self.read_key()?);
        while let Some(c) = self.next_char()? {
            if c.is_whitespace() {
                self.pending = Some(c);
                break;
            }
            token.push(c);
        }
        trace!("read token {:?}", token);
        Ok(token)
    }
    fn read_count(&mut self) -> Result<usize, Interrupt> {
        let token = self.read_token()?;
        token.parse()
            .map_err(|_| CalcError::from(ParseFractionError::InvalidDigit(token)).into())
    }
    /// Read a number, which may be written as `n/d`, `n / d` or a decimal
    fn read_fraction(&mut self) -> Result<Fraction, Interrupt> {
        let mut literal = self.read_token()?;
        if !literal.contains('/') {
            while let Some(c) = self.peek_char()? {
                if c == '\n' || !c.is_whitespace() {
                    break;
                }
                self.pending = None;
            }
            if self.peek_char()? == Some('/') {
                self.pending = None;
                literal.push('/');
            }
        }
        if literal.ends_with('/') {
            literal.push_str(&self.read_token()?);
        }
        Ok(literal.parse().map_err(CalcError::from)?)
    }
    /// Read the rest of a number literal typed at the main screen
    fn read_literal(&mut self, first: char) -> Result<Fraction, Interrupt> {
        let mut literal = first.to_string();
        let mut seen_point = first == '.';
        while let Some(c) = self.peek_char()? {
            if c == '.' && !seen_point {
                seen_point = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            self.pending = None;
            literal.push(c);
        }
        Ok(literal.parse().map_err(CalcError::from)?)
    }

    fn prompt(&mut self, message: &str) -> io::Result<()> {
        if self.config.prompts {
            write!(self.output, "{}", message)?;
        }
        Ok(())
    }
    fn print_error(&mut self, err: &CalcError) -> io::Result<()> {
        debug!("refused: {:?}", err);
        writeln!(self.output, ">>>  {}", err)
    }
    /// Print every entry on the stack, top first
    fn print_stack(&mut self) -> io::Result<()> {
        if self.calc.is_empty() {
            return self.prompt("Stack empty.\n");
        }
        for value in self.calc.stack().iter().rev() {
            write!(self.output, ">>>  ")?;
            match value {
                Value::Number(x) => writeln!(self.output, "{}", self.config.display.render(*x))?,
                Value::Matrix(matrix) => {
                    writeln!(self.output, "{}x{}", matrix.rows(), matrix.cols())?;
                    write!(self.output, "{}", matrix.indented("     "))?;
                }
            }
        }
        Ok(())
    }
    /// Print calculator errors and carry on, pass anything else along
    fn report(&mut self, result: Result<(), Interrupt>) -> Result<(), Interrupt> {
        match result {
            Err(Interrupt::Calc(err)) => Ok(self.print_error(&err)?),
            other => other
        }
    }

    /// Read and run commands until `q` or the end of input
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "For help using this calculator, enter 'h'")?;
        while let Some(command) = self.next_char()? {
            if command == 'q' {
                break;
            }
            let result = self.command(command);
            match result {
                Ok(Flow::Continue) => (),
                Ok(Flow::Quit) | Err(Interrupt::Eof) => break,
                Err(Interrupt::Calc(err)) => self.print_error(&err)?,
                Err(Interrupt::Io(err)) => return Err(err)
            }
        }
        self.output.flush()
    }
    /// Show the help screen before the calculator starts. Returns false if
    /// the user chose to quit from it.
    pub fn help_screen(&mut self) -> io::Result<bool> {
        match self.help("begin") {
            Ok(Flow::Continue) => Ok(true),
            Ok(Flow::Quit) | Err(Interrupt::Eof) => Ok(false),
            Err(Interrupt::Calc(err)) => {
                self.print_error(&err)?;
                Ok(true)
            },
            Err(Interrupt::Io(err)) => Err(err)
        }
    }

    fn command(&mut self, command: char) -> Result<Flow, Interrupt> {
        debug!("command {:?}", command);
        match command {
            '0'..='9' | '.' => {
                let x = self.read_literal(command)?;
                self.calc.push(x)?;
            },
            '\n' => self.print_stack()?,
            '+' => self.calc.add()?,
            '-' => self.calc.subtract()?,
            '*' => self.calc.multiply()?,
            '/' => self.calc.divide()?,
            '^' => self.calc.power()?,
            '!' => self.calc.factorial()?,
            '|' => self.calc.absolute_or_determinant()?,
            'c' => self.calc.change_sign()?,
            'd' => self.calc.duplicate(),
            'h' => return self.help("return to"),
            'i' => self.calc.inverse()?,
            'm' => return self.matrix_screen(),
            'o' => return self.options(),
            'p' => {
                self.calc.pop()?;
            },
            'r' => self.calc.root()?,
            's' => self.calc.swap(),
            't' => self.calc.transpose()?,
            'z' => self.calc.clear(),
            c if c.is_whitespace() => (),
            c => writeln!(self.output, "Unknown command: {}", c)?
        }
        Ok(Flow::Continue)
    }

    /// `state` finishes the sentence "Enter 'r' to ... the program."
    fn help(&mut self, state: &str) -> Result<Flow, Interrupt> {
        loop {
            writeln!(self.output, "Enter 'h' for help on using the program.")?;
            writeln!(self.output, "Enter 'c' for a list of commands that can be used.")?;
            writeln!(self.output, "Enter 'i' for information on the program.")?;
            writeln!(self.output, "Enter 'r' to {} the program.", state)?;
            writeln!(self.output, "Enter 'q' to quit the program.")?;
            match self.read_key()? {
                'c' => write!(self.output, "{}", INSTRUCTIONS)?,
                'h' => write!(self.output, "{}", DESCRIPTION)?,
                'i' => {
                    writeln!(self.output, "-----------------------------------------------")?;
                    writeln!(self.output, "{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))?;
                    writeln!(self.output, "An RPN calculator for exact fractions and matrices")?;
                    writeln!(self.output, "-----------------------------------------------")?;
                },
                'r' => return Ok(Flow::Continue),
                'q' => return Ok(Flow::Quit),
                _ => ()
            }
        }
    }

    fn options(&mut self) -> Result<Flow, Interrupt> {
        loop {
            match self.next_char()?.ok_or(Interrupt::Eof)? {
                '\n' => write!(self.output, "{}", OPTIONS)?,
                'd' => {
                    self.config.display = self.config.display.toggle();
                    debug!("display mode is now {:?}", self.config.display);
                    let name = match self.config.display {
                        DisplayMode::Fraction => "fraction",
                        DisplayMode::Decimal => "decimal"
                    };
                    writeln!(self.output, "Numbers will now be displayed as {}s.", name)?;
                },
                'p' => {
                    self.config.prompts = !self.config.prompts;
                    let state = if self.config.prompts { "en" } else { "dis" };
                    writeln!(self.output, "Prompts are now {}abled.", state)?;
                },
                'r' => return Ok(Flow::Continue),
                'q' => return Ok(Flow::Quit),
                c if c.is_whitespace() => (),
                c => writeln!(self.output, "Unknown option: {}", c)?
            }
        }
    }

    fn matrix_screen(&mut self) -> Result<Flow, Interrupt> {
        loop {
            let command = self.next_char()?.ok_or(Interrupt::Eof)?;
            match command {
                'r' => return Ok(Flow::Continue),
                'q' => return Ok(Flow::Quit),
                command => {
                    let result = self.matrix_command(command);
                    self.report(result)?;
                }
            }
        }
    }
    fn need_matrix(&self) -> Result<(), CalcError> {
        match self.calc.top_matrix() {
            Some(_) => Ok(()),
            None => Err(CalcError::NeedMatrix)
        }
    }
    fn matrix_command(&mut self, command: char) -> Result<(), Interrupt> {
        debug!("matrix command {:?}", command);
        match command {
            '\n' => match self.calc.top_matrix() {
                Some(matrix) => {
                    if self.config.prompts {
                        writeln!(self.output, "Operating on matrix:")?;
                    }
                    write!(self.output, "{}", matrix.indented("   "))?;
                },
                None => self.prompt("No matrix on top of stack.  Create a new one with 'n' or 'i'\n")?
            },
            'a' => {
                self.need_matrix()?;
                self.prompt("Add a multiple of which row?  ")?;
                let src = self.read_count()?;
                self.prompt("To what other row?  ")?;
                let dst = self.read_count()?;
                self.prompt("By what factor?  ")?;
                let factor = self.read_fraction()?;
                self.calc.add_row(src, factor, dst)?;
            },
            'e' => self.calc.reduce()?,
            'i' => {
                self.prompt("What size identity matrix?  ")?;
                let size = self.read_count()?;
                self.calc.identity(size)?;
            },
            'm' => {
                self.need_matrix()?;
                self.prompt("Multiply which row?  ")?;
                let row = self.read_count()?;
                self.prompt("By what factor?  ")?;
                let factor = self.read_fraction()?;
                self.calc.multiply_row(row, factor)?;
            },
            'n' => self.new_matrix()?,
            's' => {
                self.need_matrix()?;
                self.prompt("Which rows do you want to swap?  ")?;
                let row1 = self.read_count()?;
                let row2 = self.read_count()?;
                self.calc.switch_rows(row1, row2)?;
            },
            c if c.is_whitespace() => (),
            c => writeln!(self.output, "Unknown command: {}", c)?
        }
        Ok(())
    }
    fn new_matrix(&mut self) -> Result<(), Interrupt> {
        self.prompt("Rows?  ")?;
        let rows = self.read_count()?;
        self.prompt("Cols?  ")?;
        let cols = self.read_count()?;
        matrix_size(rows, cols)?;
        self.prompt("Please enter the entries in the matrix.\n")?;
        let mut entries = Vec::new();
        for row in 1..=rows {
            if self.config.prompts {
                write!(self.output, "Row {}  ", row)?;
            }
            for _ in 0..cols {
                entries.push(self.read_fraction()?);
            }
        }
        Ok(self.calc.new_matrix(rows, cols, entries)?)
    }
}

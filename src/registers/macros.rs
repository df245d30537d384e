use crate::registers::reg::X86_64Register;

// impl as_64bit(), as_32bit(), as_16bit(), as_8bit() for X86_64Register
macro_rules! decl_to_width {
  ($name:ident, $width:expr) => {
    impl X86_64Register {
      pub const fn $name(&self) -> Self {
        self.with_width($width)
      }
    }
  };
}

decl_to_width!(as_64bit, 64);
decl_to_width!(as_32bit, 32);
decl_to_width!(as_16bit, 16);
decl_to_width!(as_8bit, 8);

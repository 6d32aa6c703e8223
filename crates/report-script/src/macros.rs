/// Wraps a native function into a [`Value`] with a stable static identity.
macro_rules! builtin {
	($name:literal, $func:path) => {{
		static BUILTIN: $crate::objects::Builtin = $crate::objects::Builtin {
			name: $name,
			func: $func,
		};
		$crate::objects::Value::Function($crate::objects::FunctionValue::Builtin(&BUILTIN))
	}};
}

pub(crate) use builtin;

use kstring::KString;

// A `From` substitute: KString's own `From<&str>` impl is for
// `&'static str` only, so bounding on `From<&'s str>` forces
// `'s = 'static` and rules out borrowing from per-request strings.
pub trait MyFrom<T> {
    fn myfrom(s: T) -> Self;
}

impl MyFrom<&str> for KString {
    fn myfrom(s: &str) -> Self {
        KString::from_ref(s)
    }
}

impl MyFrom<&String> for KString {
    fn myfrom(s: &String) -> Self {
        KString::from_ref(s)
    }
}

impl MyFrom<String> for KString {
    fn myfrom(s: String) -> Self {
        KString::from_string(s)
    }
}

impl<'s> MyFrom<&'s str> for &'s str {
    fn myfrom(s: &'s str) -> Self {
        s
    }
}
